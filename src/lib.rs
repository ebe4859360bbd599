//! Library root for `nag-bot`.
//!
//! Nag-bot lurks in a Slack channel and reminds people about open pull requests:
//! - Whenever someone shares a link outside of the allow-list
//! - Whenever someone asks whether they can slack off
//!
//! The bot integrates with Slack for chat and Bitbucket Server for pull requests.
//! The architecture is built around extensible traits that allow for different
//! implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the nag-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with repository and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting nag-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("A crypto provider is already installed."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
