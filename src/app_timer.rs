use log::debug;
use std::{
  collections::VecDeque,
  time::{Duration, Instant},
};

// Delta times are filtered over _this many_ frames.
const DT_FILTER_WIDTH: usize = 20;
/// How often the average frame time is logged.
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

pub type FrameIdx = u64;

/// Heavily inspired by:
/// - https://github.com/EmbarkStudios/kajiya/blob/main/crates/lib/kajiya-simple/src/main_loop.rs#L329
/// - https://github.com/kayru/imgv/blob/main/src/main.rs#L918
pub struct AppTimer {
  start: Instant,
  frame_idx: FrameIdx,
  last_frame_start: Instant,
  last_report: Instant,
  /// Circular buffer for delta times
  dt_queue: VecDeque<f32>,
}

impl AppTimer {
  pub fn new() -> Self {
    Self::starting_at(Instant::now())
  }

  fn starting_at(now: Instant) -> Self {
    Self {
      start: now,
      frame_idx: 0,
      last_frame_start: now,
      last_report: now,
      dt_queue: VecDeque::with_capacity(DT_FILTER_WIDTH),
    }
  }

  /// Seconds since the timer was created. Drives the model rotation.
  pub fn elapsed_sec(&self) -> f32 {
    self.start.elapsed().as_secs_f32()
  }

  pub fn frame_count(&self) -> FrameIdx {
    self.frame_idx
  }

  /// Call once per drawn frame.
  pub fn mark_frame(&mut self) {
    self.mark_frame_at(Instant::now());
  }

  fn mark_frame_at(&mut self, now: Instant) {
    self.frame_idx = self.frame_idx.saturating_add(1);

    let dt_raw = now.saturating_duration_since(self.last_frame_start).as_secs_f32();
    self.last_frame_start = now;
    while self.dt_queue.len() >= DT_FILTER_WIDTH {
      self.dt_queue.pop_front();
    }
    self.dt_queue.push_back(dt_raw);

    if now.saturating_duration_since(self.last_report) >= REPORT_INTERVAL {
      self.last_report = now;
      debug!(
        "Frame {}, average frame time {:.2}ms",
        self.frame_idx,
        self.average_frame_time_ms()
      );
    }
  }

  pub fn average_frame_time_ms(&self) -> f32 {
    if self.dt_queue.is_empty() {
      return 0.0;
    }
    let sum = self.dt_queue.iter().copied().sum::<f32>();
    sum / (self.dt_queue.len() as f32) * 1000.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_frames_and_averages_last_deltas() {
    let t0 = Instant::now();
    let mut timer = AppTimer::starting_at(t0);
    assert_eq!(timer.average_frame_time_ms(), 0.0);

    for i in 1..=4u64 {
      timer.mark_frame_at(t0 + Duration::from_millis(10 * i));
    }

    assert_eq!(timer.frame_count(), 4);
    assert!((timer.average_frame_time_ms() - 10.0).abs() < 0.01);
  }

  #[test]
  fn average_only_covers_filter_width() {
    let t0 = Instant::now();
    let mut timer = AppTimer::starting_at(t0);

    // one long hitch, then many short frames push it out of the window
    let mut now = t0 + Duration::from_millis(500);
    timer.mark_frame_at(now);
    for _ in 0..DT_FILTER_WIDTH {
      now += Duration::from_millis(4);
      timer.mark_frame_at(now);
    }

    assert!((timer.average_frame_time_ms() - 4.0).abs() < 0.01);
  }
}
