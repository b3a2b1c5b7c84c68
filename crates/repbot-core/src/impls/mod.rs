//! Impls - in-process implementations of the ports.
//!
//! # Contents
//! - **inmem_platform**: every platform port over one locked state struct,
//!   with fault injection and a JSON fixture loader
//!
//! # Design
//! A production platform client (HTTP API, credentials, rate limits) lives
//! outside this crate and implements `ports::Platform` the same way.

pub mod inmem_platform;

pub use self::inmem_platform::{InMemoryPlatform, LabelEntry, PlatformStats, Reply};
