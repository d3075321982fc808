use std::time::Duration;

use tracing::trace;

use crate::ports::{
  IntervalScheduler,
  Subscription,
  TickCallback
};

pub const DEFAULT_WINDOW: usize = 3;
pub const DEFAULT_INTERVAL: Duration =
  Duration::from_secs(10);

/// Rotation cursor over the leading
/// `window` items of the working set.
///
/// The visible items are always the
/// first `window` entries; the cursor
/// only paces the marquee animation. It
/// is stored unreduced against the
/// current length and reduced on every
/// read, so a shrinking working set can
/// never push it out of bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
  window: usize,
  index:  usize
}

impl Carousel {
  pub fn new(window: usize) -> Self {
    Self {
      window: window.max(1),
      index:  0
    }
  }

  pub fn window(&self) -> usize {
    self.window
  }

  /// Number of items taking part in the
  /// rotation for a working set of
  /// `len` items.
  pub fn eligible(
    &self,
    len: usize
  ) -> usize {
    len.min(self.window)
  }

  pub fn visible<'a, T>(
    &self,
    working_set: &'a [T]
  ) -> &'a [T] {
    &working_set
      [..self.eligible(working_set.len())]
  }

  pub fn index(&self, len: usize) -> usize {
    self.index % self.modulus(len)
  }

  pub fn advance(
    &mut self,
    len: usize
  ) -> usize {
    let modulus = self.modulus(len);
    self.index =
      (self.index % modulus + 1) % modulus;
    trace!(
      index = self.index,
      modulus,
      "carousel advanced"
    );
    self.index
  }

  fn modulus(&self, len: usize) -> usize {
    self.eligible(len).max(1)
  }
}

/// Presentation parameters for the
/// ping-pong marquee: translate from
/// `from_percent` to `to_percent` over
/// one period, looping forever and
/// starting in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarqueeAnimation {
  pub from_percent: i32,
  pub to_percent:   i32,
  pub period:       Duration,
  pub reverse:      bool,
  pub alternate:    bool
}

impl MarqueeAnimation {
  pub fn ping_pong(
    period: Duration
  ) -> Self {
    Self {
      from_percent: 0,
      to_percent: 100,
      period,
      reverse: true,
      alternate: true
    }
  }

  /// CSS `animation` shorthand for a
  /// keyframes rule named `name`.
  pub fn css(&self, name: &str) -> String {
    let direction =
      match (self.alternate, self.reverse) {
        | (true, true) => {
          "alternate-reverse"
        }
        | (true, false) => "alternate",
        | (false, true) => "reverse",
        | (false, false) => "normal"
      };
    format!(
      "{name} {}ms linear infinite \
       {direction}",
      self.period.as_millis()
    )
  }
}

/// Owned repeating timer driving the
/// carousel. Each `start` is bound to
/// one working-set generation and
/// replaces any previous timer, so a
/// tick never runs against a replaced
/// set.
#[derive(Debug, Default)]
pub struct CarouselTimer {
  handle:     Option<Subscription>,
  generation: Option<u64>
}

impl CarouselTimer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn start(
    &mut self,
    scheduler: &dyn IntervalScheduler,
    period: Duration,
    generation: u64,
    tick: TickCallback
  ) {
    self.stop();
    self.handle =
      Some(scheduler.every(period, tick));
    self.generation = Some(generation);
    trace!(
      generation,
      period_ms = period.as_millis() as u64,
      "carousel timer armed"
    );
  }

  pub fn stop(&mut self) {
    if let Some(handle) =
      self.handle.take()
    {
      handle.unsubscribe();
      trace!(
        generation = ?self.generation,
        "carousel timer stopped"
      );
    }
    self.generation = None;
  }

  pub fn is_running(&self) -> bool {
    self.handle.is_some()
  }

  pub fn generation(&self) -> Option<u64> {
    self.generation
  }
}
