// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters for fast, CI-runnable engine tests without external
//! services.

pub mod mock_issuer;
pub mod mock_post_client;

pub use mock_issuer::MockCredentialIssuer;
pub use mock_post_client::{MockPostClient, RecordedPost};
