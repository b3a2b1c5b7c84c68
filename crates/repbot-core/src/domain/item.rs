//! Platform items as seen by the pipeline.
//!
//! Items are opaque references owned by the platform. The pipeline only
//! reads the handful of fields it needs: who wrote it, where it lives and
//! what it replies to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::TaskError;

/// Fullname prefix of a submission (thread root).
pub const SUBMISSION_PREFIX: &str = "t3_";

/// Fullname prefix of a comment.
pub const COMMENT_PREFIX: &str = "t1_";

/// Platform id of a comment or submission, without type prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The comment a command was issued from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: ItemId,
    pub author: String,
    pub body: String,
    /// Raw parent fullname (`t3_…` or `t1_…`). Parsed lazily by the resolver
    /// so that a malformed value rejects only the task that carries it.
    pub parent_id: String,
    pub community: String,
}

/// Typed parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    Submission(ItemId),
    Comment(ItemId),
}

impl ParentRef {
    /// Parse a parent fullname.
    pub fn parse(fullname: &str) -> Result<Self, TaskError> {
        let malformed = || TaskError::MalformedParent {
            parent_id: fullname.to_string(),
        };
        if let Some(id) = fullname.strip_prefix(SUBMISSION_PREFIX) {
            if id.is_empty() {
                return Err(malformed());
            }
            Ok(Self::Submission(ItemId::new(id)))
        } else if let Some(id) = fullname.strip_prefix(COMMENT_PREFIX) {
            if id.is_empty() {
                return Err(malformed());
            }
            Ok(Self::Comment(ItemId::new(id)))
        } else {
            Err(malformed())
        }
    }

    pub fn id(&self) -> &ItemId {
        match self {
            Self::Submission(id) | Self::Comment(id) => id,
        }
    }

    pub fn kind(&self) -> RootKind {
        match self {
            Self::Submission(_) => RootKind::Submission,
            Self::Comment(_) => RootKind::Comment,
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission(id) => write!(f, "{SUBMISSION_PREFIX}{id}"),
            Self::Comment(id) => write!(f, "{COMMENT_PREFIX}{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    Submission,
    Comment,
}

/// What the content fetcher returns for a parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootItem {
    pub kind: RootKind,
    pub id: ItemId,
    pub author: String,
}

/// Who a command rates. Transient, lives for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub is_submission_root: bool,
    pub author: String,
}
