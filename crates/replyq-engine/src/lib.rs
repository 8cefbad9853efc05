// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The posting queue engine: error classification, rate governance,
//! credential leasing, and the batch control loop.
//!
//! The engine depends only on the adapter traits in `replyq-core`; the
//! SQLite store and the HTTP clients are injected by the binary.

pub mod classifier;
pub mod governor;
pub mod lease;
pub mod notify;
pub mod processor;

pub use classifier::classify;
pub use governor::RateGovernor;
pub use lease::CredentialLeaseManager;
pub use notify::StatusNotifier;
pub use processor::BatchProcessor;
