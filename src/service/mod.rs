//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by the nag-bot:
//! - Chat services (e.g., Slack)
//! - Repository services (e.g., Bitbucket Server)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod repo;
