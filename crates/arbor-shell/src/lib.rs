//! Frame driver for Arbor: turns host frame and pointer events into build,
//! layout, paint, and finalize passes over one top-level view.

mod frame_stats;
mod hit_path_tracker;
mod shell;

pub use frame_stats::FrameStats;
pub use hit_path_tracker::PointerId;
pub use shell::{DevOptions, Frame, FrameTimings, Shell};

pub use arbor_widgets as widgets;
