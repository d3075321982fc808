use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{
  Rc,
  Weak
};
use std::time::Duration;

use tracing::trace;

use crate::ports::{
  IntervalScheduler,
  Subscription,
  TickCallback
};

type SharedTick = Rc<RefCell<TickCallback>>;

struct VirtualTimer {
  period:   Duration,
  next_due: Duration,
  tick:     SharedTick
}

#[derive(Default)]
struct ClockState {
  now:     Duration,
  next_id: u64,
  timers:  BTreeMap<u64, VirtualTimer>
}

/// Interval scheduler on a virtual
/// clock. Time only moves through
/// `advance`; due ticks fire in time
/// order, ties broken by registration
/// order.
#[derive(Clone, Default)]
pub struct ManualScheduler {
  state: Rc<RefCell<ClockState>>
}

impl ManualScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn now(&self) -> Duration {
    self.state.borrow().now
  }

  pub fn active_timers(&self) -> usize {
    self.state.borrow().timers.len()
  }

  /// Moves the clock forward by `by`,
  /// firing every tick that falls due on
  /// the way. Returns the number of ticks
  /// fired.
  pub fn advance(
    &self,
    by: Duration
  ) -> usize {
    let target = self.now() + by;
    let mut fired = 0;

    loop {
      let due = {
        let state = self.state.borrow();
        state
          .timers
          .iter()
          .filter(|(_, timer)| {
            timer.next_due <= target
          })
          .min_by_key(|(id, timer)| {
            (timer.next_due, **id)
          })
          .map(|(id, timer)| {
            (
              *id,
              timer.next_due,
              timer.tick.clone()
            )
          })
      };

      let Some((id, due_at, tick)) = due
      else {
        break;
      };

      {
        let mut state =
          self.state.borrow_mut();
        state.now = due_at;
        if let Some(timer) =
          state.timers.get_mut(&id)
        {
          timer.next_due =
            due_at + timer.period;
        }
      }

      trace!(
        timer = id,
        at_ms = due_at.as_millis() as u64,
        "virtual tick"
      );
      (tick.borrow_mut())();
      fired += 1;
    }

    self.state.borrow_mut().now = target;
    fired
  }
}

impl IntervalScheduler for ManualScheduler {
  fn every(
    &self,
    period: Duration,
    tick: TickCallback
  ) -> Subscription {
    let period =
      period.max(Duration::from_millis(1));
    let id = {
      let mut state =
        self.state.borrow_mut();
      let id = state.next_id;
      state.next_id += 1;
      let next_due = state.now + period;
      state.timers.insert(id, VirtualTimer {
        period,
        next_due,
        tick: Rc::new(RefCell::new(tick))
      });
      id
    };

    let weak: Weak<RefCell<ClockState>> =
      Rc::downgrade(&self.state);
    Subscription::new(move || {
      if let Some(state) = weak.upgrade() {
        state.borrow_mut().timers.remove(&id);
      }
    })
  }
}
