//! InMemoryPlatform - in-process platform for development and tests.
//!
//! Implements every platform port over plain collections behind one async
//! mutex.
//!
//! # Helpers
//! - seeding helpers (`add_submission`, `add_comment`, `set_label`);
//! - inspection helpers and call counters (`stats`);
//! - fault injection for label writes, replies and the mention fetch;
//! - a JSON fixture loader used by the CLI dry run.
//!
//! # Mention delivery
//! - A mention stays fetchable until its comment is marked processed, so a
//!   rejected command shows up again on a later fetch.
//! - Mentions never returned before fill the `limit` first, in arrival order.
//!   Redelivered mentions only take the slots that are left, so unprocessed
//!   rejects cannot crowd out newer commands.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{
    Command, CommandTask, Comment, ItemId, MENTION_PRIORITY, ParentRef, PlatformError, RootItem,
    RootKind,
};
use crate::ports::{
    Clock, ContentFetcher, IdGenerator, LabelStore, MentionSource, ProcessedMarker, ReplyPoster,
    SystemClock, UlidGenerator,
};

/// Counters for every call that touches platform state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub mention_fetches: usize,
    pub root_fetches: usize,
    pub label_reads: usize,
    pub label_writes: usize,
    pub replies: usize,
    pub marks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub text: String,
    #[serde(default)]
    pub css_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub item: ItemId,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    submissions: Vec<FixtureSubmission>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default)]
    labels: Vec<FixtureLabel>,
}

#[derive(Debug, Deserialize)]
struct FixtureSubmission {
    id: ItemId,
    author: String,
}

#[derive(Debug, Deserialize)]
struct FixtureLabel {
    community: String,
    user: String,
    text: String,
}

#[derive(Default)]
struct PlatformState {
    submissions: HashMap<ItemId, String>,
    comments: HashMap<ItemId, Comment>,
    /// Comment ids in arrival order.
    arrival: Vec<ItemId>,
    labels: HashMap<(String, String), LabelEntry>,
    processed: HashSet<ItemId>,
    /// Mentions returned by at least one fetch.
    delivered: HashSet<ItemId>,
    replies: Vec<Reply>,
    stats: PlatformStats,
    fail_mention_fetch: bool,
    fail_label_writes: bool,
    fail_replies: bool,
}

pub struct InMemoryPlatform {
    bot_username: String,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    state: Mutex<PlatformState>,
}

impl InMemoryPlatform {
    pub fn new(bot_username: impl Into<String>) -> Self {
        Self::with_clock(bot_username, SystemClock)
    }

    /// Tasks get `enqueued_at` and id timestamps from `clock`.
    pub fn with_clock<C: Clock + Clone + 'static>(bot_username: impl Into<String>, clock: C) -> Self {
        Self {
            bot_username: bot_username.into(),
            clock: Box::new(clock.clone()),
            ids: Box::new(UlidGenerator::new(clock)),
            state: Mutex::new(PlatformState::default()),
        }
    }

    /// Build a platform from a JSON fixture:
    ///
    /// ```json
    /// {
    ///   "submissions": [{"id": "s1", "author": "alice"}],
    ///   "comments": [{"id": "c1", "author": "bob", "body": "u/repbot positive",
    ///                 "parent_id": "t3_s1", "community": "cardtrades"}],
    ///   "labels": [{"community": "cardtrades", "user": "alice",
    ///               "text": "Positive: 2 Neutral: 0 Negative: 1"}]
    /// }
    /// ```
    pub fn from_fixture(json: &str, bot_username: impl Into<String>) -> Result<Self, serde_json::Error> {
        let fixture: Fixture = serde_json::from_str(json)?;
        let mut state = PlatformState::default();
        for s in fixture.submissions {
            state.submissions.insert(s.id, s.author);
        }
        for c in fixture.comments {
            state.arrival.push(c.id.clone());
            state.comments.insert(c.id.clone(), c);
        }
        for l in fixture.labels {
            state.labels.insert(
                (l.community, l.user),
                LabelEntry {
                    text: l.text,
                    css_class: String::new(),
                },
            );
        }
        let platform = Self::new(bot_username);
        Ok(Self {
            state: Mutex::new(state),
            ..platform
        })
    }

    pub async fn add_submission(&self, id: impl Into<String>, author: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.submissions.insert(ItemId::new(id), author.into());
    }

    pub async fn add_comment(&self, comment: Comment) {
        let mut state = self.state.lock().await;
        if !state.comments.contains_key(&comment.id) {
            state.arrival.push(comment.id.clone());
        }
        state.comments.insert(comment.id.clone(), comment);
    }

    pub async fn set_label(&self, community: &str, user: &str, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.labels.insert(
            (community.to_string(), user.to_string()),
            LabelEntry {
                text: text.into(),
                css_class: String::new(),
            },
        );
    }

    pub async fn label(&self, community: &str, user: &str) -> Option<LabelEntry> {
        let state = self.state.lock().await;
        state
            .labels
            .get(&(community.to_string(), user.to_string()))
            .cloned()
    }

    /// All labels, sorted by community then user.
    pub async fn labels(&self) -> Vec<(String, String, LabelEntry)> {
        let state = self.state.lock().await;
        let mut out: Vec<_> = state
            .labels
            .iter()
            .map(|((community, user), entry)| (community.clone(), user.clone(), entry.clone()))
            .collect();
        out.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        out
    }

    pub async fn replies(&self) -> Vec<Reply> {
        self.state.lock().await.replies.clone()
    }

    pub async fn replies_to(&self, item: &ItemId) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .replies
            .iter()
            .filter(|r| &r.item == item)
            .map(|r| r.text.clone())
            .collect()
    }

    pub async fn is_marked(&self, item: &ItemId) -> bool {
        self.state.lock().await.processed.contains(item)
    }

    /// Mark without counting it as a pipeline call.
    pub async fn preset_processed(&self, item: &ItemId) {
        self.state.lock().await.processed.insert(item.clone());
    }

    pub async fn stats(&self) -> PlatformStats {
        self.state.lock().await.stats.clone()
    }

    pub async fn fail_mention_fetch(&self, fail: bool) {
        self.state.lock().await.fail_mention_fetch = fail;
    }

    pub async fn fail_label_writes(&self, fail: bool) {
        self.state.lock().await.fail_label_writes = fail;
    }

    pub async fn fail_replies(&self, fail: bool) {
        self.state.lock().await.fail_replies = fail;
    }
}

#[async_trait]
impl MentionSource for InMemoryPlatform {
    async fn fetch_new_mentions(&self, limit: usize) -> Result<Vec<CommandTask>, PlatformError> {
        let mut state = self.state.lock().await;
        state.stats.mention_fetches += 1;
        if state.fail_mention_fetch {
            return Err(PlatformError::Transport("mention inbox unavailable".to_string()));
        }

        let pending: Vec<(Comment, Command)> = state
            .arrival
            .iter()
            .filter(|id| !state.processed.contains(*id))
            .filter_map(|id| state.comments.get(id))
            .filter_map(|comment| {
                Command::parse_mention(&comment.body, &self.bot_username)
                    .map(|command| (comment.clone(), command))
            })
            .collect();
        let (fresh, redelivered): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|(comment, _)| !state.delivered.contains(&comment.id));

        let mut tasks = Vec::new();
        for (comment, command) in fresh.into_iter().chain(redelivered).take(limit) {
            state.delivered.insert(comment.id.clone());
            tasks.push(CommandTask::new(
                self.ids.generate_task_id(),
                command,
                comment,
                MENTION_PRIORITY,
                self.clock.now(),
            ));
        }
        Ok(tasks)
    }
}

#[async_trait]
impl ProcessedMarker for InMemoryPlatform {
    async fn is_processed(&self, item: &ItemId) -> Result<bool, PlatformError> {
        Ok(self.state.lock().await.processed.contains(item))
    }

    async fn mark_processed(&self, item: &ItemId) -> Result<(), PlatformError> {
        let mut state = self.state.lock().await;
        if !state.comments.contains_key(item) {
            return Err(PlatformError::not_found("comment", item.as_str()));
        }
        state.stats.marks += 1;
        state.processed.insert(item.clone());
        Ok(())
    }
}

#[async_trait]
impl ContentFetcher for InMemoryPlatform {
    async fn fetch_root(&self, parent: &ParentRef) -> Result<RootItem, PlatformError> {
        let mut state = self.state.lock().await;
        state.stats.root_fetches += 1;
        match parent {
            ParentRef::Submission(id) => state
                .submissions
                .get(id)
                .map(|author| RootItem {
                    kind: RootKind::Submission,
                    id: id.clone(),
                    author: author.clone(),
                })
                .ok_or_else(|| PlatformError::not_found("submission", id.as_str())),
            ParentRef::Comment(id) => state
                .comments
                .get(id)
                .map(|c| RootItem {
                    kind: RootKind::Comment,
                    id: id.clone(),
                    author: c.author.clone(),
                })
                .ok_or_else(|| PlatformError::not_found("comment", id.as_str())),
        }
    }
}

#[async_trait]
impl LabelStore for InMemoryPlatform {
    async fn read_label(&self, community: &str, user: &str) -> Result<Option<String>, PlatformError> {
        let mut state = self.state.lock().await;
        state.stats.label_reads += 1;
        Ok(state
            .labels
            .get(&(community.to_string(), user.to_string()))
            .map(|entry| entry.text.clone()))
    }

    async fn write_label(
        &self,
        community: &str,
        user: &str,
        text: &str,
        css_class: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().await;
        if state.fail_label_writes {
            return Err(PlatformError::Rejected(format!("label write refused for {user}")));
        }
        state.stats.label_writes += 1;
        state.labels.insert(
            (community.to_string(), user.to_string()),
            LabelEntry {
                text: text.to_string(),
                css_class: css_class.to_string(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl ReplyPoster for InMemoryPlatform {
    async fn post_reply(&self, item: &ItemId, text: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().await;
        if state.fail_replies {
            return Err(PlatformError::Transport(format!("reply to {item} timed out")));
        }
        if !state.comments.contains_key(item) {
            return Err(PlatformError::not_found("comment", item.as_str()));
        }
        state.stats.replies += 1;
        state.replies.push(Reply {
            item: item.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}
