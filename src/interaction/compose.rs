//! Turns aggregated pull requests into the reminder posted back to the channel.

use chrono::{DateTime, Utc};

use crate::base::{
    config::Config,
    messages,
    time_ago::time_ago,
    types::{AggregationResult, TriggerMode},
};

/// Builds reminder text from aggregated pull requests.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    base_url: String,
    repositories: Vec<String>,
    report_partial_failures: bool,
}

impl MessageComposer {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.stash_url.clone(),
            repositories: config.repositories.clone(),
            report_partial_failures: config.report_partial_failures,
        }
    }

    /// Composes the message for `result`, or `None` when nothing should be sent.
    pub fn compose(&self, result: &AggregationResult, mode: TriggerMode, now: DateTime<Utc>) -> Option<String> {
        let failure_note = (self.report_partial_failures && !result.failed_repositories.is_empty())
            .then(|| messages::partial_failure_note(&result.failed_repositories));

        if result.is_empty() {
            return match (mode, failure_note) {
                (TriggerMode::Summon, Some(note)) => Some(format!("{}\n{}", messages::NOTHING_PENDING, note)),
                (TriggerMode::Summon, None) => Some(messages::NOTHING_PENDING.to_string()),
                (TriggerMode::Reminder, note) => note,
            };
        }

        let opening = match mode {
            TriggerMode::Reminder => messages::REMINDER_OPENING,
            TriggerMode::Summon => messages::SUMMON_OPENING,
        };

        let mut message = String::from(opening);
        message.push_str(&messages::count_sentence(result.len(), &self.repositories));

        for request in &result.requests {
            message.push_str(&format!(
                " * {} créée {} ({}/{})\n",
                request.title,
                time_ago(request.created_at, now),
                self.base_url,
                request.web_link
            ));
        }

        if let Some(note) = failure_note {
            message.push('\n');
            message.push_str(&note);
        }

        message.push_str(messages::CLOSING);

        Some(message)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use crate::base::{config::ConfigInner, types::ReviewRequest};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn composer(report_partial_failures: bool) -> MessageComposer {
        MessageComposer::new(&Config::from(ConfigInner {
            stash_url: "http://stash.example.com".to_string(),
            repositories: vec!["api".to_string(), "auth".to_string()],
            report_partial_failures,
            ..Default::default()
        }))
    }

    fn request(title: &str, days_ago: i64) -> ReviewRequest {
        ReviewRequest {
            title: title.to_string(),
            created_at: now() - Duration::days(days_ago),
            web_link: format!("projects/P/repos/api/pull-requests/{days_ago}"),
            is_open: true,
        }
    }

    #[test]
    fn test_empty_reminder_sends_nothing() {
        assert_eq!(composer(false).compose(&AggregationResult::default(), TriggerMode::Reminder, now()), None);
    }

    #[test]
    fn test_empty_summon_acknowledges() {
        let message = composer(false).compose(&AggregationResult::default(), TriggerMode::Summon, now());
        assert_eq!(message.as_deref(), Some(messages::NOTHING_PENDING));
    }

    #[test]
    fn test_reminder_layout() {
        let result = AggregationResult {
            requests: vec![request("Fix login", 2)],
            failed_repositories: vec![],
        };

        let message = composer(false).compose(&result, TriggerMode::Reminder, now()).unwrap();

        let expected = format!(
            "{}Il reste encore 1 pull request(s) ouverte(s) sur les projets api et auth.\n\n * Fix login créée il y a 2 jours (http://stash.example.com/projects/P/repos/api/pull-requests/2)\n{}",
            messages::REMINDER_OPENING,
            messages::CLOSING
        );
        assert_eq!(message, expected);
    }

    #[test]
    fn test_summon_uses_its_own_opening_and_keeps_order() {
        let result = AggregationResult {
            requests: vec![request("first", 1), request("second", 5)],
            failed_repositories: vec![],
        };

        let message = composer(false).compose(&result, TriggerMode::Summon, now()).unwrap();

        assert!(message.starts_with(messages::SUMMON_OPENING));
        assert!(message.contains("Il reste encore 2 pull request(s)"));
        assert!(message.find("first").unwrap() < message.find("second").unwrap());
        assert!(message.ends_with(messages::CLOSING));
    }

    #[test]
    fn test_partial_failures_only_reported_when_enabled() {
        let result = AggregationResult {
            requests: vec![request("Fix login", 2)],
            failed_repositories: vec!["auth".to_string()],
        };

        let quiet = composer(false).compose(&result, TriggerMode::Reminder, now()).unwrap();
        assert!(!quiet.contains("impossible de joindre"));

        let loud = composer(true).compose(&result, TriggerMode::Reminder, now()).unwrap();
        assert!(loud.contains("(Attention: impossible de joindre auth.)"));
    }

    #[test]
    fn test_total_failure_is_never_an_all_clear() {
        let result = AggregationResult {
            requests: vec![],
            failed_repositories: vec!["api".to_string()],
        };

        let summon = composer(true).compose(&result, TriggerMode::Summon, now()).unwrap();
        assert!(summon.starts_with(messages::NOTHING_PENDING));
        assert!(summon.contains("(Attention: impossible de joindre api.)"));

        let reminder = composer(true).compose(&result, TriggerMode::Reminder, now());
        assert_eq!(reminder.as_deref(), Some("(Attention: impossible de joindre api.)\n"));

        // Without the opt-in, the silent behaviour stays.
        assert_eq!(composer(false).compose(&result, TriggerMode::Reminder, now()), None);
        assert_eq!(composer(false).compose(&result, TriggerMode::Summon, now()).as_deref(), Some(messages::NOTHING_PENDING));
    }
}
