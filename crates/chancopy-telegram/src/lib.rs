//! Telegram adapters.
//!
//! Two very different surfaces live here: the MTProto user-session client
//! (channel history, downloads, uploads) behind `ChannelPort`, and the plain
//! Bot API `sendMessage` call behind `NotifierPort`.

pub mod client;
pub mod notifier;

pub use client::ChannelClient;
pub use notifier::BotNotifier;
