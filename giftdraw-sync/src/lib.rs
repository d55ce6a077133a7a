//! # giftdraw-sync
//!
//! Outbound collaborators that run after the guest list changes: the
//! hash-gated remote [`mirror`] and the host [`notify`] channel, tied
//! together by [`pipeline::run`].

pub mod error;
pub mod hash_store;
pub mod mirror;
pub mod notify;
pub mod pipeline;

pub use error::SyncError;
pub use mirror::{push_guests_at, GitHubContents, PushOutcome, PutRequest, RemoteStore};
pub use notify::{Email, HttpMailer, Notifier, OutboxMailer};
pub use pipeline::{Collaborator, Collaborators, Mutation, PipelineReport, Warning};
