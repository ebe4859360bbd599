//! Event handling and user interactions for nag-bot.
//!
//! This module provides functionality for handling chat events:
//! - Classifying message text (off-topic links, summon phrases)
//! - Composing the reminder from aggregated pull requests
//! - Routing a message from intake to dispatch

pub mod chat_event;
pub mod classify;
pub mod compose;
