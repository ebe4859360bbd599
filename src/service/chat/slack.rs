//! Slack implementation of the chat client.
//!
//! Listens over socket mode, turns message events into `ChatMessage`s, and
//! hands them to the message router.

use crate::{
    base::{
        config::Config,
        types::{ChatMessage, ChatMessageType, ConversationHandle, Res, Void},
    },
    interaction::{self, chat_event::MessageRouter},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    ///
    /// Fails when the bot token is rejected, since nothing else can work after that.
    pub async fn slack(config: &Config, router: MessageRouter) -> Res<Self> {
        let client = SlackChatClient::new(config, router).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    router: MessageRouter,
    chat: ChatClient,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    client: Arc<FullClient>,
    router: MessageRouter,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, router: MessageRouter) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Check the credentials up front.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await.map_err(|e| anyhow::anyhow!("Invalid Slack credentials, go grab a valid token: {}", e))?;

        info!("Slack bot user ID: {}", bot_user.user_id.0);

        Ok(Self {
            app_token,
            bot_token,
            client,
            router,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            router: self.router.clone(),
            chat: ChatClient::from(self.clone()),
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events.
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Serve until Ctrl-C.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve_conversation(&self, conversation_id: &str) -> Res<ConversationHandle> {
        let request = SlackApiConversationsInfoRequest::new(SlackChannelId(conversation_id.to_string()));
        let session = self.client.open_session(&self.bot_token);

        let response = session
            .conversations_info(&request)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to resolve conversation `{}`: {}", conversation_id, e))?;

        Ok(ConversationHandle { id: response.channel.id.0 })
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, conversation: &ConversationHandle, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(conversation.id.clone()), message).with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Helpers.

/// Maps a Slack message event onto the transport-neutral message.
///
/// Edits, joins and bot posts are kept, but typed as `Other`.
fn to_chat_message(event: &SlackMessageEvent) -> Option<ChatMessage> {
    let conversation_id = event.origin.channel.as_ref()?.0.clone();

    let kind = if event.subtype.is_some() || event.sender.bot_id.is_some() {
        ChatMessageType::Other
    } else {
        ChatMessageType::Message
    };

    let text = event.content.as_ref().and_then(|c| c.text.clone());

    Some(ChatMessage { kind, text, conversation_id })
}

// Socket mode listener callbacks for Slack.

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            let Some(message) = to_chat_message(&slack_message_event) else {
                warn!("Skipping message event without a channel.");
                return Ok(());
            };

            debug!("Received message event ...");

            interaction::chat_event::handle_chat_event(message, user_state.router.clone(), user_state.chat.clone());
        }
        _ => {
            debug!("Received unhandled push event.")
        }
    }

    Ok(())
}

// Tests.
