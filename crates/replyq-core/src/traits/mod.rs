// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions at the engine's seams.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility, so the
//! batch processor can be exercised against mocks as well as the real SQLite
//! store and HTTP platform client.

pub mod credentials;
pub mod post;
pub mod store;

pub use credentials::CredentialIssuer;
pub use post::PostClient;
pub use store::QueueStore;
