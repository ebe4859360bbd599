//! Pure text predicates that decide whether a message deserves a reminder.

use regex::{Regex, RegexBuilder};

use crate::base::{
    config::Config,
    types::{Res, TriggerMode},
};

/// Classifies message text against the configured allow-list and summon phrase.
#[derive(Debug, Clone)]
pub struct TextClassifier {
    allowed_links: Vec<String>,
    summon: Regex,
}

impl TextClassifier {
    /// Builds a classifier from the configuration.
    pub fn new(config: &Config) -> Res<Self> {
        Self::from_parts(config.allowed_links.clone(), &config.summon_pattern)
    }

    pub fn from_parts(allowed_links: Vec<String>, summon_pattern: &str) -> Res<Self> {
        let summon = RegexBuilder::new(summon_pattern).case_insensitive(true).build()?;

        Ok(Self { allowed_links, summon })
    }

    /// Returns `false` only when `text` contains a link and none of the allow-listed prefixes.
    pub fn contains_allowed_link(&self, text: &str) -> bool {
        if !text.contains("http://") && !text.contains("https://") {
            return true;
        }

        self.allowed_links.iter().any(|prefix| text.contains(prefix.as_str()))
    }

    /// Returns `true` when `text` asks whether one may slack off.
    pub fn is_summon_phrase(&self, text: &str) -> bool {
        self.summon.is_match(text)
    }

    /// Decides whether `text` needs action, and with which template.
    pub fn classify(&self, text: &str) -> Option<TriggerMode> {
        if self.is_summon_phrase(text) {
            Some(TriggerMode::Summon)
        } else if !self.contains_allowed_link(text) {
            Some(TriggerMode::Reminder)
        } else {
            None
        }
    }
}

// Tests.
