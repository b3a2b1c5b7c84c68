//! Pipeline - fetch, then drain the queue one task at a time.
//!
//! # Flow per task
//! 1. `is_processed` -> Skipped (no reply, no mutation)
//! 2. community check -> Skipped
//! 3. validate directive -> Validated | Rejected
//! 4. resolve target -> Resolved | Rejected
//! 5. read label, increment, write label -> Scored
//! 6. success reply, then mark processed -> Acknowledged
//!
//! Rejected tasks get one error reply and no score change. Platform failures
//! end the task as `TaskOutcome::Failed` and are never retried in-process;
//! the next cycle refetches anything still unprocessed.
//!
//! # Sequencing
//! Tasks run strictly one after another. The label store has no atomic
//! increment, so two tasks rating the same user in one cycle are only safe
//! because the second read happens after the first write. Running tasks
//! concurrently would need per-user locking at the store boundary.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};

use super::{resolver, validator};
use crate::config::{BotConfig, RejectPolicy};
use crate::domain::{
    CommandTask, CycleReport, Directive, PlatformError, ResolvedTarget, ScoreLabel, SkipReason,
    TaskError, TaskId, TaskOutcome, TaskState,
};
use crate::ports::Platform;
use crate::queue::TaskQueue;

/// Tracks where a task is in the state machine.
struct TaskRun {
    id: TaskId,
    state: TaskState,
}

impl TaskRun {
    fn new(id: TaskId) -> Self {
        Self {
            id,
            state: TaskState::Received,
        }
    }

    fn advance(&mut self, next: TaskState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(task_id = %self.id, from = %self.state, to = %next, "transition");
        self.state = next;
    }

    fn failed(&self, err: impl std::fmt::Display) -> TaskOutcome {
        TaskOutcome::Failed {
            reached: self.state,
            error: err.to_string(),
        }
    }
}

/// Result of the steps that may end in a rejection.
struct Scored {
    target: ResolvedTarget,
    label: ScoreLabel,
}

pub struct Pipeline<P: Platform + ?Sized> {
    platform: Arc<P>,
    queue: Box<dyn TaskQueue>,
    config: BotConfig,
}

impl<P: Platform + ?Sized> Pipeline<P> {
    /// Prefer `PipelineBuilder`, which validates the config first.
    pub fn new(platform: Arc<P>, queue: Box<dyn TaskQueue>, config: BotConfig) -> Self {
        Self {
            platform,
            queue,
            config,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    pub fn queue_size(&self) -> usize {
        self.queue.size()
    }

    /// One poll cycle: fetch up to `fetch_limit` mentions into the queue,
    /// then drain it.
    ///
    /// Only a failed fetch fails the cycle. Per-task platform failures are
    /// logged, counted in the report, and the drain moves on.
    pub async fn process_one_cycle(&mut self, fetch_limit: usize) -> Result<CycleReport, PlatformError> {
        let tasks = self.platform.fetch_new_mentions(fetch_limit).await?;
        let mut report = CycleReport {
            fetched: tasks.len(),
            ..CycleReport::default()
        };
        for task in tasks {
            self.queue.enqueue(task);
        }
        info!(fetched = report.fetched, queue_size = self.queue.size(), "cycle started");

        while let Some(task) = self.queue.dequeue() {
            let outcome = self.process_task(task).await;
            report.record(&outcome);
            debug!(queue_size = self.queue.size(), "task finished");
        }

        report.queue_remaining = self.queue.size();
        Ok(report)
    }

    /// Run one task to a terminal outcome.
    pub async fn process_task(&self, task: CommandTask) -> TaskOutcome {
        let span = info_span!(
            "task",
            task_id = %task.id,
            item = %task.item.id,
            author = %task.item.author,
        );
        async {
            let outcome = self.run(&task).await;
            log_outcome(&outcome);
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(&self, task: &CommandTask) -> TaskOutcome {
        let mut run = TaskRun::new(task.id);

        match self.platform.is_processed(&task.item.id).await {
            Ok(true) => {
                run.advance(TaskState::Skipped);
                return TaskOutcome::Skipped {
                    reason: SkipReason::AlreadyProcessed,
                };
            }
            Ok(false) => {}
            Err(err) => return run.failed(err),
        }

        if task.item.community != self.config.community {
            run.advance(TaskState::Skipped);
            return TaskOutcome::Skipped {
                reason: SkipReason::ForeignCommunity,
            };
        }

        match self.score(task, &mut run).await {
            Ok(scored) => self.acknowledge(task, &mut run, scored).await,
            Err(err) if err.is_user_facing() => self.reject(task, &mut run, err).await,
            Err(err) => run.failed(err),
        }
    }

    /// Validate, resolve, then do the single read-modify-write on the label.
    async fn score(&self, task: &CommandTask, run: &mut TaskRun) -> Result<Scored, TaskError> {
        let directive: Directive = validator::validate(&task.command)?;
        run.advance(TaskState::Validated);

        let target = resolver::resolve(&*self.platform, &task.item).await?;
        run.advance(TaskState::Resolved);

        let community = &self.config.community;
        let current = self.platform.read_label(community, &target.author).await?;
        let label = ScoreLabel::decode(current.as_deref().unwrap_or_default()).increment(directive);
        self.platform
            .write_label(community, &target.author, &label.encode(), &self.config.label_css_class)
            .await?;
        run.advance(TaskState::Scored);
        info!(user = %target.author, %directive, label = %label, "label updated");

        Ok(Scored { target, label })
    }

    /// Reply first, mark second: a failed reply leaves the item to be picked
    /// up again next cycle.
    async fn acknowledge(&self, task: &CommandTask, run: &mut TaskRun, scored: Scored) -> TaskOutcome {
        if let Err(err) = self
            .platform
            .post_reply(&task.item.id, &self.config.success_reply)
            .await
        {
            return run.failed(err);
        }
        if let Err(err) = self.platform.mark_processed(&task.item.id).await {
            return run.failed(err);
        }
        run.advance(TaskState::Acknowledged);
        TaskOutcome::Acknowledged {
            target: scored.target.author,
            label: scored.label,
        }
    }

    async fn reject(&self, task: &CommandTask, run: &mut TaskRun, reason: TaskError) -> TaskOutcome {
        let message = reason.to_string();
        if let Err(err) = self.platform.post_reply(&task.item.id, &message).await {
            return run.failed(err);
        }
        run.advance(TaskState::Rejected);

        if self.config.reject_policy == RejectPolicy::Settle
            && let Err(err) = self.platform.mark_processed(&task.item.id).await
        {
            return run.failed(err);
        }
        TaskOutcome::Rejected { message }
    }
}

fn log_outcome(outcome: &TaskOutcome) {
    match outcome {
        TaskOutcome::Acknowledged { target: user, .. } => info!(%user, "acknowledged"),
        TaskOutcome::Rejected { message } => warn!(%message, "rejected"),
        TaskOutcome::Skipped { reason } => info!(?reason, "skipped"),
        TaskOutcome::Failed { reached, error } => error!(%reached, %error, "task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Command, Comment, ItemId};
    use crate::impls::{InMemoryPlatform, PlatformStats};
    use crate::queue::InMemoryTaskQueue;
    use chrono::Utc;
    use ulid::Ulid;

    const COMMUNITY: &str = "cardtrades";
    const SUBMISSION: &str = "s1";

    fn comment(id: &str, author: &str, directive: &str, parent_id: &str) -> Comment {
        Comment {
            id: ItemId::new(id),
            author: author.to_string(),
            body: format!("u/repbot {directive}"),
            parent_id: parent_id.to_string(),
            community: COMMUNITY.to_string(),
        }
    }

    fn task_for(item: Comment) -> CommandTask {
        let command = Command::parse_mention(&item.body, "repbot").unwrap();
        CommandTask::new(TaskId::from_ulid(Ulid::new()), command, item, 2, Utc::now())
    }

    async fn setup(config: BotConfig) -> (Arc<InMemoryPlatform>, Pipeline<InMemoryPlatform>) {
        let platform = Arc::new(InMemoryPlatform::new("repbot"));
        platform.add_submission(SUBMISSION, "alice").await;
        let pipeline = Pipeline::new(
            Arc::clone(&platform),
            Box::new(InMemoryTaskQueue::new()),
            config,
        );
        (platform, pipeline)
    }

    fn config() -> BotConfig {
        BotConfig::new(COMMUNITY)
    }

    #[tokio::test]
    async fn positive_vote_updates_label_and_acknowledges() {
        let (platform, pipeline) = setup(config()).await;
        platform
            .set_label(COMMUNITY, "alice", "Positive: 2 Neutral: 0 Negative: 1")
            .await;
        let item = comment("c1", "bob", "positive", "t3_s1");
        platform.add_comment(item.clone()).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert_eq!(
            outcome,
            TaskOutcome::Acknowledged {
                target: "alice".to_string(),
                label: ScoreLabel::new(3, 0, 1),
            }
        );
        let label = platform.label(COMMUNITY, "alice").await.unwrap();
        assert_eq!(label.text, "Positive: 3 Neutral: 0 Negative: 1");
        assert_eq!(
            platform.replies_to(&ItemId::new("c1")).await,
            vec![crate::config::DEFAULT_SUCCESS_REPLY.to_string()]
        );
        assert!(platform.is_marked(&ItemId::new("c1")).await);
        assert_eq!(
            platform.stats().await,
            PlatformStats {
                mention_fetches: 0,
                root_fetches: 1,
                label_reads: 1,
                label_writes: 1,
                replies: 1,
                marks: 1,
            }
        );
    }

    #[tokio::test]
    async fn invalid_directive_replies_once_and_writes_nothing() {
        let (platform, pipeline) = setup(config()).await;
        let item = comment("c1", "bob", "shout", "t3_s1");
        platform.add_comment(item.clone()).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        let TaskOutcome::Rejected { message } = outcome else {
            panic!("expected rejection, got {outcome:?}");
        };
        assert!(message.contains("shout"));
        let replies = platform.replies_to(&ItemId::new("c1")).await;
        assert_eq!(replies, vec![message]);
        assert!(!platform.is_marked(&ItemId::new("c1")).await);
        let stats = platform.stats().await;
        assert_eq!(stats.label_reads, 0);
        assert_eq!(stats.label_writes, 0);
        assert_eq!(stats.root_fetches, 0);
        assert_eq!(stats.marks, 0);
    }

    #[tokio::test]
    async fn self_rating_is_rejected_without_touching_labels() {
        let (platform, pipeline) = setup(config()).await;
        let item = comment("c1", "alice", "positive", "t3_s1");
        platform.add_comment(item.clone()).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert_eq!(
            outcome,
            TaskOutcome::Rejected {
                message: TaskError::SelfTarget.to_string()
            }
        );
        let stats = platform.stats().await;
        assert_eq!(stats.label_reads, 0);
        assert_eq!(stats.label_writes, 0);
        assert_eq!(stats.replies, 1);
        assert_eq!(platform.label(COMMUNITY, "alice").await, None);
    }

    #[tokio::test]
    async fn malformed_parent_is_rejected() {
        let (platform, pipeline) = setup(config()).await;
        let item = comment("c1", "bob", "neutral", "t9_what");
        platform.add_comment(item.clone()).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert!(matches!(outcome, TaskOutcome::Rejected { ref message } if message.contains("t9_what")));
        assert_eq!(platform.stats().await.label_writes, 0);
    }

    #[tokio::test]
    async fn processed_item_is_skipped_without_side_effects() {
        let (platform, pipeline) = setup(config()).await;
        let item = comment("c1", "bob", "positive", "t3_s1");
        platform.add_comment(item.clone()).await;
        platform.preset_processed(&item.id).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert_eq!(
            outcome,
            TaskOutcome::Skipped {
                reason: SkipReason::AlreadyProcessed
            }
        );
        let stats = platform.stats().await;
        assert_eq!(stats.label_writes, 0);
        assert_eq!(stats.replies, 0);
        assert_eq!(stats.marks, 0);
    }

    #[tokio::test]
    async fn other_community_is_skipped() {
        let (platform, pipeline) = setup(config()).await;
        let mut item = comment("c1", "bob", "positive", "t3_s1");
        item.community = "elsewhere".to_string();
        platform.add_comment(item.clone()).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert_eq!(
            outcome,
            TaskOutcome::Skipped {
                reason: SkipReason::ForeignCommunity
            }
        );
        assert!(platform.replies().await.is_empty());
    }

    #[tokio::test]
    async fn label_write_failure_is_fatal_and_sends_nothing() {
        let (platform, pipeline) = setup(config()).await;
        let item = comment("c1", "bob", "positive", "t3_s1");
        platform.add_comment(item.clone()).await;
        platform.fail_label_writes(true).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert!(matches!(
            outcome,
            TaskOutcome::Failed {
                reached: TaskState::Resolved,
                ..
            }
        ));
        assert!(platform.replies().await.is_empty());
        assert!(!platform.is_marked(&ItemId::new("c1")).await);
    }

    #[tokio::test]
    async fn reply_failure_leaves_item_unmarked() {
        let (platform, pipeline) = setup(config()).await;
        let item = comment("c1", "bob", "negative", "t3_s1");
        platform.add_comment(item.clone()).await;
        platform.fail_replies(true).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert!(matches!(
            outcome,
            TaskOutcome::Failed {
                reached: TaskState::Scored,
                ..
            }
        ));
        assert!(!platform.is_marked(&ItemId::new("c1")).await);
        assert_eq!(platform.stats().await.marks, 0);
    }

    #[tokio::test]
    async fn settle_policy_marks_rejected_items() {
        let mut cfg = config();
        cfg.reject_policy = RejectPolicy::Settle;
        let (platform, pipeline) = setup(cfg).await;
        let item = comment("c1", "bob", "shout", "t3_s1");
        platform.add_comment(item.clone()).await;

        let outcome = pipeline.process_task(task_for(item)).await;

        assert!(matches!(outcome, TaskOutcome::Rejected { .. }));
        assert!(platform.is_marked(&ItemId::new("c1")).await);
    }

    #[tokio::test]
    async fn css_class_is_passed_through() {
        let mut cfg = config();
        cfg.label_css_class = "trader".to_string();
        let (platform, pipeline) = setup(cfg).await;
        let item = comment("c1", "bob", "neutral", "t3_s1");
        platform.add_comment(item.clone()).await;

        pipeline.process_task(task_for(item)).await;

        let label = platform.label(COMMUNITY, "alice").await.unwrap();
        assert_eq!(label.text, "Positive: 0 Neutral: 1 Negative: 0");
        assert_eq!(label.css_class, "trader");
    }

    #[tokio::test]
    async fn cycle_applies_every_vote_for_the_same_user() {
        let (platform, mut pipeline) = setup(config()).await;
        platform.add_comment(comment("c1", "bob", "positive", "t3_s1")).await;
        platform.add_comment(comment("c2", "carol", "positive", "t3_s1")).await;
        platform.add_comment(comment("c3", "dave", "negative", "t3_s1")).await;

        let report = pipeline.process_one_cycle(10).await.unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.acknowledged, 3);
        assert_eq!(report.queue_remaining, 0);
        assert_eq!(pipeline.queue_size(), 0);
        let label = platform.label(COMMUNITY, "alice").await.unwrap();
        assert_eq!(label.text, "Positive: 2 Neutral: 0 Negative: 1");
    }

    #[tokio::test]
    async fn rejected_items_come_back_next_cycle_under_retry_policy() {
        let (platform, mut pipeline) = setup(config()).await;
        platform.add_comment(comment("c1", "bob", "shout", "t3_s1")).await;
        platform.add_comment(comment("c2", "carol", "positive", "t3_s1")).await;

        let first = pipeline.process_one_cycle(10).await.unwrap();
        assert_eq!((first.rejected, first.acknowledged), (1, 1));

        let second = pipeline.process_one_cycle(10).await.unwrap();
        assert_eq!(second.fetched, 1);
        assert_eq!(second.rejected, 1);
        assert_eq!(platform.replies_to(&ItemId::new("c1")).await.len(), 2);
    }

    #[tokio::test]
    async fn rejected_backlog_larger_than_fetch_limit_does_not_starve_new_votes() {
        let (platform, mut pipeline) = setup(config()).await;
        for id in ["c1", "c2", "c3"] {
            platform.add_comment(comment(id, "bob", "shout", "t3_s1")).await;
        }
        platform.add_comment(comment("c4", "carol", "positive", "t3_s1")).await;

        let first = pipeline.process_one_cycle(2).await.unwrap();
        assert_eq!((first.rejected, first.acknowledged), (2, 0));

        let second = pipeline.process_one_cycle(2).await.unwrap();
        assert_eq!((second.rejected, second.acknowledged), (1, 1));
        let label = platform.label(COMMUNITY, "alice").await.unwrap();
        assert_eq!(label.text, "Positive: 1 Neutral: 0 Negative: 0");
        assert!(platform.is_marked(&ItemId::new("c4")).await);

        // Rejects still recur once nothing new is waiting.
        let third = pipeline.process_one_cycle(2).await.unwrap();
        assert_eq!((third.fetched, third.rejected), (2, 2));
        assert_eq!(platform.replies_to(&ItemId::new("c1")).await.len(), 2);
        assert_eq!(platform.replies_to(&ItemId::new("c3")).await.len(), 1);
    }

    #[tokio::test]
    async fn task_failure_does_not_stop_the_drain() {
        let (platform, mut pipeline) = setup(config()).await;
        platform.add_comment(comment("c1", "bob", "positive", "t3_missing")).await;
        platform.add_comment(comment("c2", "carol", "positive", "t3_s1")).await;

        let report = pipeline.process_one_cycle(10).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.acknowledged, 1);
        assert!(platform.replies_to(&ItemId::new("c1")).await.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_cycle() {
        let (platform, mut pipeline) = setup(config()).await;
        platform.fail_mention_fetch(true).await;

        let err = pipeline.process_one_cycle(10).await.unwrap_err();
        assert!(matches!(err, PlatformError::Transport(_)));
    }

    #[tokio::test]
    async fn fetch_limit_caps_the_cycle() {
        let (platform, mut pipeline) = setup(config()).await;
        for i in 0..4 {
            platform
                .add_comment(comment(&format!("c{i}"), "bob", "positive", "t3_s1"))
                .await;
        }

        let report = pipeline.process_one_cycle(2).await.unwrap();
        assert_eq!(report.fetched, 2);

        let report = pipeline.process_one_cycle(2).await.unwrap();
        assert_eq!(report.fetched, 2);

        let report = pipeline.process_one_cycle(2).await.unwrap();
        assert_eq!(report.fetched, 0);
    }
}
