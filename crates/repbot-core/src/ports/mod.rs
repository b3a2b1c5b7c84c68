//! Ports - the seams to everything outside the core.
//!
//! The pipeline depends only on these traits. `impls` holds the in-process
//! implementations; a real platform client implements `Platform` elsewhere.

pub mod clock;
pub mod id_generator;
pub mod platform;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::platform::{
    ContentFetcher, LabelStore, MentionSource, Platform, ProcessedMarker, ReplyPoster,
};
