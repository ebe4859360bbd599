//! Common types shared across the nag-bot.

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The kind of an inbound chat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessageType {
    /// A plain, user-authored message.
    Message,
    /// Anything else (edits, joins, bot messages, etc.).
    Other,
}

/// An inbound chat message, as delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: ChatMessageType,
    pub text: Option<String>,
    pub conversation_id: String,
}

impl ChatMessage {
    /// Creates a plain user message.
    pub fn message(text: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            kind: ChatMessageType::Message,
            text: Some(text.into()),
            conversation_id: conversation_id.into(),
        }
    }
}

/// A resolved destination for outbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHandle {
    pub id: String,
}

/// An open pull request on one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Path of the pull request, relative to the repository server URL.
    pub web_link: String,
    pub is_open: bool,
}

/// Which message template a triggered run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Someone posted an off-topic link.
    Reminder,
    /// Someone explicitly asked whether they can slack off.
    Summon,
}

/// How the aggregator fans out over the configured repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Parallel,
    Sequential,
}

/// Merged pull requests across every configured repository.
///
/// `requests` keeps repository order first, then the order returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationResult {
    pub requests: Vec<ReviewRequest>,
    /// Repositories whose fetch failed, in configured order.
    pub failed_repositories: Vec<String>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}
