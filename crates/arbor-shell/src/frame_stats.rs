//! Rolling frame statistics.
//!
//! Counts frames the shell actually delivered, not idle time: a host that
//! only asks for frames when work is pending sees a low rate while idle.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

/// Number of frames averaged for the rate.
const FRAME_HISTORY_SIZE: usize = 60;

/// Frame statistics snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frames per second over the recent history.
    pub fps: f32,
    /// Average interval between recent frames in milliseconds.
    pub avg_ms: f32,
    /// Frames delivered since the shell was created.
    pub frame_count: u64,
    /// Wall time of the most recent frame pass.
    pub last_frame: Duration,
    /// Elements rebuilt by the most recent frame pass.
    pub last_rebuilds: usize,
}

impl FrameStats {
    pub fn display(&self) -> String {
        format!("{:.0} FPS ({:.1}ms)", self.fps, self.avg_ms)
    }
}

pub(crate) struct FrameTracker {
    frame_times: VecDeque<Instant>,
    stats: FrameStats,
}

impl FrameTracker {
    pub(crate) fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(FRAME_HISTORY_SIZE + 1),
            stats: FrameStats::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, started: Instant, elapsed: Duration, rebuilds: usize) {
        self.frame_times.push_back(started);
        while self.frame_times.len() > FRAME_HISTORY_SIZE {
            self.frame_times.pop_front();
        }
        self.stats.frame_count += 1;
        self.stats.last_frame = elapsed;
        self.stats.last_rebuilds = rebuilds;

        if let (Some(first), Some(last)) = (self.frame_times.front(), self.frame_times.back()) {
            let intervals = (self.frame_times.len() - 1) as f32;
            let span = last.duration_since(*first).as_secs_f32();
            if intervals > 0.0 && span > 0.0 {
                self.stats.fps = intervals / span;
                self.stats.avg_ms = span * 1000.0 / intervals;
            }
        }
    }

    pub(crate) fn stats(&self) -> FrameStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "tests/frame_stats_tests.rs"]
mod tests;
