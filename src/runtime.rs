//! Runtime services and shared state for the nag-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::chat_event::MessageRouter,
    service::{chat::ChatClient, repo::RepoClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the repository client, message router, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The repository client instance.
    pub repo: RepoClient,
    /// The message router instance.
    pub router: MessageRouter,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the repository client.
        let repo = RepoClient::stash(&config)?;

        // Initialize the router.
        let router = MessageRouter::new(&config, repo.clone())?;

        // Initialize the slack client.
        let chat = ChatClient::slack(&config, router.clone()).await?;

        Ok(Self { config, repo, router, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
