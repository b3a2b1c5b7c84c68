//! Platform ports - the social platform as seen by the pipeline.
//!
//! One trait per capability so that tests and alternative clients can
//! implement only what they touch. `Platform` bundles them for the pipeline.
//!
//! # Design
//! - Every method is a suspension point; implementations own their own
//!   timeouts.
//! - The label store has no atomic increment. Callers must serialize
//!   read-modify-write per user (the pipeline does so by running one task at
//!   a time).

use async_trait::async_trait;

use crate::domain::{CommandTask, ItemId, ParentRef, PlatformError, RootItem};

/// Discovers new inbound commands.
#[async_trait]
pub trait MentionSource: Send + Sync {
    /// Build tasks for at most `limit` new mentions.
    async fn fetch_new_mentions(&self, limit: usize) -> Result<Vec<CommandTask>, PlatformError>;
}

/// The platform-side "processed" flag that makes reprocessing idempotent.
#[async_trait]
pub trait ProcessedMarker: Send + Sync {
    async fn is_processed(&self, item: &ItemId) -> Result<bool, PlatformError>;

    async fn mark_processed(&self, item: &ItemId) -> Result<(), PlatformError>;
}

/// Fetches the object a comment replies to.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_root(&self, parent: &ParentRef) -> Result<RootItem, PlatformError>;
}

/// Per-user label text, scoped to a community.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// `None` when the user has no label yet.
    async fn read_label(&self, community: &str, user: &str) -> Result<Option<String>, PlatformError>;

    async fn write_label(
        &self,
        community: &str,
        user: &str,
        text: &str,
        css_class: &str,
    ) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait ReplyPoster: Send + Sync {
    async fn post_reply(&self, item: &ItemId, text: &str) -> Result<(), PlatformError>;
}

/// Everything the pipeline needs from the platform.
pub trait Platform: MentionSource + ProcessedMarker + ContentFetcher + LabelStore + ReplyPoster {}

impl<T> Platform for T where
    T: MentionSource + ProcessedMarker + ContentFetcher + LabelStore + ReplyPoster
{
}
