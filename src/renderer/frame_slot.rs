/// Index of the synchronization triple used by the current frame, in `[0, frames_in_flight)`.
/// Has nothing to do with the swapchain image index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSlot {
  idx: usize,
  frames_in_flight: usize,
}

impl FrameSlot {
  pub fn new(frames_in_flight: usize) -> Self {
    Self {
      idx: 0,
      frames_in_flight: frames_in_flight.max(1),
    }
  }

  pub fn idx(&self) -> usize {
    self.idx
  }

  pub fn frames_in_flight(&self) -> usize {
    self.frames_in_flight
  }

  /// Only after the frame was submitted.
  pub fn advance(&mut self) {
    self.idx = (self.idx + 1) % self.frames_in_flight;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wraps_around() {
    let mut slot = FrameSlot::new(3);
    let seen: Vec<usize> = (0..7)
      .map(|_| {
        let idx = slot.idx();
        slot.advance();
        idx
      })
      .collect();
    assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
  }

  #[test]
  fn single_frame_in_flight_stays_at_zero() {
    let mut slot = FrameSlot::new(1);
    slot.advance();
    slot.advance();
    assert_eq!(slot.idx(), 0);
  }
}
