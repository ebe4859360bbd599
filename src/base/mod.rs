//! Core components, types, and utilities for the nag-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Fixed message templates in the target locale.
//! - Relative time formatting.
//! - Common types and result handling.

pub mod config;
pub mod messages;
pub mod time_ago;
pub mod types;
