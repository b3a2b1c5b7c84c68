//! Target resolution: who does a command rate?
//!
//! The target is the author of whatever the command comment replies to.
//! This runs before any label is read, so a self-rating attempt is rejected
//! without touching score state.
//!
//! # Design
//! - `t3_` parents resolve to a submission, `t1_` parents to a comment
//! - Any other parent id is `MalformedParent`, without a fetch
//! - Author names compare exactly, case included

use crate::domain::{Comment, ParentRef, ResolvedTarget, RootKind, TaskError};
use crate::ports::ContentFetcher;

/// # Example
/// ```ignore
/// let target = resolve(platform.as_ref(), &task.item).await?;
/// tracing::info!(user = %target.author, "resolved");
/// ```
pub async fn resolve<F>(fetcher: &F, item: &Comment) -> Result<ResolvedTarget, TaskError>
where
    F: ContentFetcher + ?Sized,
{
    let parent = ParentRef::parse(&item.parent_id)?;
    let root = fetcher.fetch_root(&parent).await?;

    if root.author == item.author {
        return Err(TaskError::SelfTarget);
    }

    Ok(ResolvedTarget {
        is_submission_root: root.kind == RootKind::Submission,
        author: root.author,
    })
}
