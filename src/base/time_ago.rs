//! Relative time formatting in French ("il y a 3 jours").

use chrono::{DateTime, Utc};

/// Formats `timestamp` relative to `now`, e.g. `il y a 2 heures` or `dans un mois`.
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(timestamp);
    let seconds = delta.num_seconds();
    let phrase = humanize(seconds.unsigned_abs());

    if seconds < 0 { format!("dans {phrase}") } else { format!("il y a {phrase}") }
}

fn humanize(seconds: u64) -> String {
    let seconds = seconds as f64;
    let minutes = (seconds / 60.0).round();
    let hours = (seconds / 3600.0).round();
    let days = (seconds / 86400.0).round();
    let months = (days / 30.4).round();
    let years = (days / 365.0).round();

    if seconds < 45.0 {
        "quelques secondes".to_string()
    } else if seconds < 90.0 {
        "une minute".to_string()
    } else if minutes < 45.0 {
        format!("{minutes} minutes")
    } else if minutes < 90.0 {
        "une heure".to_string()
    } else if hours < 22.0 {
        format!("{hours} heures")
    } else if hours < 36.0 {
        "un jour".to_string()
    } else if days < 26.0 {
        format!("{days} jours")
    } else if days < 46.0 {
        "un mois".to_string()
    } else if months < 11.0 {
        format!("{} mois", months.max(2.0))
    } else if months < 18.0 {
        "un an".to_string()
    } else {
        format!("{} ans", years.max(2.0))
    }
}

// Tests.
