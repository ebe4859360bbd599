//! Routes inbound chat messages through classification, aggregation and dispatch.

use std::{ops::Deref, sync::Arc};

use chrono::Utc;
use tracing::{Instrument, error, info, instrument};

use crate::{
    base::{
        config::Config,
        types::{ChatMessage, ChatMessageType, FetchMode, Res},
    },
    interaction::{classify::TextClassifier, compose::MessageComposer},
    service::{chat::ChatClient, repo::RepoClient},
};

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Not a user message, or no text.
    Ignored,
    /// The text is fine; nothing to do.
    Valid,
    /// Triggered, but there was nothing worth sending.
    NothingToSend,
    /// A message was sent back to the conversation.
    Sent,
}

/// Message router for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct MessageRouter {
    inner: Arc<MessageRouterInner>,
}

impl Deref for MessageRouter {
    type Target = MessageRouterInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Read-only state shared by every routed message.
pub struct MessageRouterInner {
    pub classifier: TextClassifier,
    pub composer: MessageComposer,
    pub repo: RepoClient,
    pub repositories: Vec<String>,
    pub fetch_mode: FetchMode,
}

impl MessageRouter {
    /// Create a new router from the configuration.
    pub fn new(config: &Config, repo: RepoClient) -> Res<Self> {
        let inner = MessageRouterInner {
            classifier: TextClassifier::new(config)?,
            composer: MessageComposer::new(config),
            repo,
            repositories: config.repositories.clone(),
            fetch_mode: config.fetch_mode,
        };

        Ok(Self { inner: Arc::new(inner) })
    }

    /// Handle one message start to finish.
    #[instrument(skip_all, fields(conversation_id = %message.conversation_id))]
    pub async fn route(&self, message: &ChatMessage, chat: &ChatClient) -> Res<RouteOutcome> {
        // Filter.

        let text = match (&message.kind, message.text.as_deref()) {
            (ChatMessageType::Message, Some(text)) if !text.is_empty() => text,
            _ => return Ok(RouteOutcome::Ignored),
        };

        // Classify.

        let Some(mode) = self.classifier.classify(text) else {
            info!("Message is valid, no action.");
            return Ok(RouteOutcome::Valid);
        };

        info!("Message triggered a {:?}.", mode);

        // Aggregate and compose.

        let result = self.repo.aggregate(&self.repositories, self.fetch_mode).await;

        let Some(reply) = self.composer.compose(&result, mode, Utc::now()) else {
            info!("No pending requests, no action.");
            return Ok(RouteOutcome::NothingToSend);
        };

        // Dispatch.

        let conversation = chat.resolve_conversation(&message.conversation_id).await?;
        chat.send_message(&conversation, &reply).await?;

        Ok(RouteOutcome::Sent)
    }
}

/// Handles an inbound chat message on its own task.
#[instrument(skip_all)]
pub fn handle_chat_event(message: ChatMessage, router: MessageRouter, chat: ChatClient) {
    tokio::spawn(async move {
        // Process the event.
        let result = router.route(&message, &chat).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}
