//! PipelineBuilder - wiring with start-up validation.
//!
//! # Design
//! - `build()` runs `BotConfig::validate` before anything else
//! - A missing platform is a `BuildError`, not a panic at the first cycle
//! - The queue is optional and defaults to `InMemoryTaskQueue`

use std::sync::Arc;

use super::Pipeline;
use crate::config::{BotConfig, ConfigError};
use crate::ports::Platform;
use crate::queue::{InMemoryTaskQueue, TaskQueue};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no platform was provided")]
    MissingPlatform,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// # Example
/// ```ignore
/// let pipeline = PipelineBuilder::new(config)
///     .platform(Arc::new(client))
///     .build()?;
/// ```
pub struct PipelineBuilder<P: Platform + ?Sized> {
    config: BotConfig,
    platform: Option<Arc<P>>,
    queue: Option<Box<dyn TaskQueue>>,
}

impl<P: Platform + ?Sized> PipelineBuilder<P> {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            platform: None,
            queue: None,
        }
    }

    pub fn platform(mut self, platform: Arc<P>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Defaults to `InMemoryTaskQueue`.
    pub fn queue(mut self, queue: Box<dyn TaskQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn build(self) -> Result<Pipeline<P>, BuildError> {
        self.config.validate()?;
        let platform = self.platform.ok_or(BuildError::MissingPlatform)?;
        let queue = self
            .queue
            .unwrap_or_else(|| Box::new(InMemoryTaskQueue::new()));
        Ok(Pipeline::new(platform, queue, self.config))
    }
}
