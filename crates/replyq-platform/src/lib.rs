// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Posting platform integration: the HTTP post client and the OAuth token
//! client.
//!
//! Both implement the adapter traits from `replyq-core`, so the engine never
//! depends on this crate directly.

pub mod client;
pub mod oauth;
pub mod types;

pub use client::PlatformClient;
pub use oauth::TokenClient;
