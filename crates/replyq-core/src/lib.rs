// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the replyq posting queue engine.
//!
//! Provides the shared error type, the domain types (queue entries, post
//! outcomes, classifications, batch summaries), and the adapter traits the
//! batch processor is written against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ReplyqError;
pub use traits::{CredentialIssuer, PostClient, QueueStore};
pub use types::{
    BatchSummary, Credential, EntrySource, EntryStatus, ErrorClassification, ErrorKind,
    HaltReason, LastError, ListFilter, NewEntry, PostOutcome, QueueEntry, QueueStats,
    ReplyPayload, StatusChange,
};
