use std::time::Duration;

use gloo::timers::callback::Interval;
use taskdeck_core::ports::{
  IntervalScheduler,
  Subscription,
  TickCallback
};

/// Browser interval timers. Dropping the
/// returned subscription drops the
/// `Interval`, which clears it.
pub struct GlooScheduler;

impl IntervalScheduler for GlooScheduler {
  fn every(
    &self,
    period: Duration,
    mut tick: TickCallback
  ) -> Subscription {
    let millis = u32::try_from(
      period.as_millis()
    )
    .unwrap_or(u32::MAX)
    .max(1);
    let interval =
      Interval::new(millis, move || tick());
    Subscription::new(move || {
      drop(interval)
    })
  }
}
