//! Discord-facing pieces: REST client, interaction payloads, command definitions.

pub mod client;
pub mod commands;
pub mod interaction;
pub mod response_builder;

pub use client::DiscordClient;
pub use interaction::Interaction;
