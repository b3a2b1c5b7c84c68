//! App - composes the ports into the moderation pipeline.
//!
//! # Components
//! - **validator**: directive vocabulary gate
//! - **resolver**: rating target from thread context
//! - **pipeline**: per-task state machine and `process_one_cycle`
//! - **builder**: wiring with start-up validation
//! - **poll_loop**: the scheduler that calls the pipeline on an interval
//!
//! # Example
//! ```ignore
//! let pipeline = PipelineBuilder::new(config).platform(platform).build()?;
//! let handle = PollLoop::new(interval, fetch_limit).spawn(pipeline);
//! let summary = handle.shutdown_and_join().await?;
//! ```

pub mod builder;
pub mod pipeline;
pub mod poll_loop;
pub mod resolver;
pub mod validator;

pub use self::builder::{BuildError, PipelineBuilder};
pub use self::pipeline::Pipeline;
pub use self::poll_loop::{PollHandle, PollLoop, PollSummary};
