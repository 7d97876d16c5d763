//! Title/body builders for scheduled notification kinds.

/// How many mission names the morning briefing lists before truncating.
const BRIEFING_MISSION_LIMIT: usize = 3;

/// A rendered notification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub title: String,
    pub body: String,
}

/// Morning briefing listing the user's recent missions.
pub fn morning_briefing(missions: &[String]) -> MessageTemplate {
    let body = if missions.is_empty() {
        "Check today's missions in the app!".to_string()
    } else {
        let listed = missions
            .iter()
            .take(BRIEFING_MISSION_LIMIT)
            .cloned()
            .collect::<Vec<_>>()
            .join(" • ");
        let extra = missions.len().saturating_sub(BRIEFING_MISSION_LIMIT);
        if extra > 0 {
            format!("{listed} (+{extra} more)")
        } else {
            listed
        }
    };
    MessageTemplate {
        title: "Good morning! Your missions for today".to_string(),
        body,
    }
}

/// Weekly health report announcement.
pub fn weekly_report() -> MessageTemplate {
    MessageTemplate {
        title: "Your weekly report is ready!".to_string(),
        body: "See how your health week went.".to_string(),
    }
}

/// Re-engagement nudge after a stretch of inactivity.
pub fn re_engagement(days_inactive: i64) -> MessageTemplate {
    MessageTemplate {
        title: "We miss you!".to_string(),
        body: format!(
            "It has been {days_inactive} days since your last completed mission. \
             Ready to get back on track?"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn briefing_lists_up_to_three_missions() {
        let missions = vec!["Drink water".to_string(), "Walk 5km".to_string()];
        let t = morning_briefing(&missions);
        assert_eq!(t.body, "Drink water • Walk 5km");
    }

    #[test]
    fn briefing_truncates_with_a_more_suffix() {
        let missions: Vec<String> =
            ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let t = morning_briefing(&missions);
        assert_eq!(t.body, "a • b • c (+2 more)");
    }

    #[test]
    fn briefing_without_missions_points_at_the_app() {
        let t = morning_briefing(&[]);
        assert!(t.body.contains("missions in the app"));
    }

    #[test]
    fn re_engagement_names_the_day_count() {
        let t = re_engagement(3);
        assert!(t.body.contains("3 days"));
    }
}
