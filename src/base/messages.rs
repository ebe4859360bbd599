//! Fixed, user-facing message templates (French locale).

/// Opening sentence when someone shared an off-topic link.
pub const REMINDER_OPENING: &str = "Vous vous permettez de glander sur le web maintenant?? ";

/// Opening sentence when someone explicitly asked to slack off.
pub const SUMMON_OPENING: &str = "Glander? Pas si vite! ";

/// Closing exhortation appended to every reminder.
pub const CLOSING: &str = "\n\nHop Hop Hop! Au boulot!!! :angry:";

/// Reply to a summon when nothing is pending.
pub const NOTHING_PENDING: &str = "Aucune pull request en attente. Tu peux glander tranquille :sunglasses:";

/// Builds the sentence stating how many pull requests remain, and where.
pub fn count_sentence(count: usize, repositories: &[String]) -> String {
    format!("Il reste encore {count} pull request(s) ouverte(s) sur les projets {}.\n\n", join_names(repositories))
}

/// Builds the note listing repositories that could not be reached.
pub fn partial_failure_note(failed: &[String]) -> String {
    format!("(Attention: impossible de joindre {}.)\n", join_names(failed))
}

/// Joins names as a French enumeration: `a, b et c`.
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} et {}", init.join(", "), last),
    }
}

// Tests.
