use crate::model::Goal;

pub fn format_goal_table(goals: &[Goal]) -> String {
    let mut output = format!("{:<4} {:<10} {:<8} {}\n", "#", "KIND", "POINTS", "STATUS");
    for (idx, goal) in goals.iter().enumerate() {
        output.push_str(&format!(
            "{:<4} {:<10} {:<8} {}\n",
            idx + 1,
            goal.kind().as_str(),
            goal.points(),
            goal.status()
        ));
    }
    output.trim_end().to_string()
}

pub fn format_goal_list(goals: &[Goal]) -> String {
    let mut output = String::new();
    for (idx, goal) in goals.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", idx + 1, goal.status()));
    }
    output.trim_end().to_string()
}

pub fn format_goal_detail(position: usize, goal: &Goal) -> String {
    let mut output = String::new();
    output.push_str(&format!("Goal #{position}\n"));
    output.push_str(&format!("Kind: {}\n", goal.kind().as_str()));
    output.push_str(&format!("Name: {}\n", goal.name()));
    output.push_str(&format!("Points: {}\n", goal.points()));
    match goal {
        Goal::Simple(_) => {
            output.push_str(&format!("Complete: {}\n", goal.is_complete()));
        }
        Goal::Eternal(_) => {
            output.push_str("Complete: never\n");
        }
        Goal::Checklist(checklist) => {
            output.push_str(&format!("Complete: {}\n", goal.is_complete()));
            output.push_str(&format!(
                "Progress: {}/{}\n",
                checklist.completed_count(),
                checklist.total_count()
            ));
            output.push_str(&format!(
                "Points per check: {}\n",
                checklist.points_per_check()
            ));
            output.push_str(&format!("Bonus: {}\n", checklist.bonus()));
        }
    }
    output.push_str(&format!("Status: {}", goal.status()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GoalInput;

    #[test]
    fn checklist_detail_shows_progress() {
        let mut goal = GoalInput::checklist("Temple", 3, 50, None)
            .build()
            .expect("checklist");
        goal.record_achievement().expect("record");
        let detail = format_goal_detail(2, &goal);
        assert!(detail.starts_with("Goal #2\nKind: checklist\n"));
        assert!(detail.contains("Progress: 1/3\n"));
        assert!(detail.contains("Bonus: 500\n"));
        assert!(detail.ends_with("Status: [ ] Temple (Completed 1/3)"));
    }

    #[test]
    fn list_numbers_goals_from_one() {
        let goals = vec![
            GoalInput::simple("Hike", 50).build().expect("simple"),
            GoalInput::eternal("Pray").build().expect("eternal"),
        ];
        assert_eq!(
            format_goal_list(&goals),
            "1. [ ] Hike\n2. [∞] Pray (Points Earned: 0)"
        );
        assert_eq!(format_goal_list(&[]), "");
    }

    #[test]
    fn table_has_header_and_one_row_per_goal() {
        let goals = vec![GoalInput::simple("Hike", 50).build().expect("simple")];
        let table = format_goal_table(&goals);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#    KIND"));
        assert!(lines[1].starts_with("1    simple     50"));
        assert!(lines[1].ends_with("[ ] Hike"));
    }
}
