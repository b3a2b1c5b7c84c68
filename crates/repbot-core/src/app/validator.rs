//! Command validation: the single gate between requester text and scoring.
//!
//! # Design
//! - Pure function, no port access
//! - Arguments after the directive are never inspected
//! - A failure carries the raw directive so the error reply can quote it

use crate::domain::{Command, Directive, TaskError};

/// Accept exactly `positive`, `neutral` or `negative` (case-sensitive).
///
/// # Example
/// ```ignore
/// let directive = validate(&Command::new("positive", vec![]))?;
/// assert_eq!(directive, Directive::Positive);
/// ```
pub fn validate(command: &Command) -> Result<Directive, TaskError> {
    Directive::from_keyword(&command.directive).ok_or_else(|| TaskError::InvalidCommand {
        directive: command.directive.clone(),
    })
}
