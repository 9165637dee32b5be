//! TILI Speech - Narration and announcements
//!
//! Output side of the accessibility engine:
//! - Capability traits for speech synthesis and live regions
//! - Narration builder with a fixed sentence order
//! - Announcement engine with configuration gating and last-write-wins speech
//! - Virtual-time timer queue for staggered and deferred narration

#![warn(missing_docs)]

pub mod backend;
pub mod engine;
pub mod narration;
pub mod timer;

pub use backend::{
    LiveRegion, NullLiveRegion, NullSynthesizer, OnEnd, Politeness, SpeechSynthesizer, Utterance,
};
pub use engine::{
    AnnouncementEngine, EngineTiming, FieldGuide, ItemCount, PageContext, PageStructure,
};
pub use narration::{count_phrase, join_list, Narration, Ordinal};
pub use timer::{Timer, TimerHandle, TimerQueue, TimerTask};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with TILI speech
    pub use crate::{
        AnnouncementEngine, LiveRegion, Narration, Politeness, SpeechSynthesizer, Timer,
        TimerQueue,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
