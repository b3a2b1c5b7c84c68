//! repbot-core
//!
//! Core of a moderation bot that keeps a per-user reputation label
//! ("Positive: P Neutral: N Negative: D") up to date from mention commands.
//!
//! # Modules
//! - **domain**: value types (commands, items, labels, states, outcomes, errors)
//! - **ports**: traits for the platform, clock and id generation
//! - **queue**: priority task queue
//! - **app**: validator, resolver, pipeline, builder, poll loop
//! - **impls**: in-memory platform for development and tests
//! - **config**: `BotConfig`

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;

pub use app::{Pipeline, PipelineBuilder, PollLoop};
pub use config::BotConfig;
