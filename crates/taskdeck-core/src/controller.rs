use std::cell::{
  Cell,
  RefCell
};
use std::rc::{
  Rc,
  Weak
};
use std::time::Duration;

use taskdeck_shared::{
  TaskDocument,
  TaskDto,
  TaskFilter
};
use tracing::{
  debug,
  error,
  info,
  warn
};

use crate::carousel::{
  Carousel,
  CarouselTimer,
  MarqueeAnimation
};
use crate::config::DeckConfig;
use crate::error::DeckError;
use crate::filter::{
  section_title,
  working_set
};
use crate::model::tasks_from_snapshot;
use crate::ports::{
  DocumentStore,
  IntervalScheduler,
  Navigator,
  Subscription
};
use crate::route::Route;
use crate::session::{
  SessionResolver,
  notify
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
  pub collection: String,
  pub interval:   Duration,
  pub window:     usize
}

impl From<&DeckConfig> for ControllerSettings {
  fn from(cfg: &DeckConfig) -> Self {
    Self {
      collection: cfg
        .store
        .collection
        .clone(),
      interval:   cfg.carousel.interval(),
      window:     cfg.carousel.window
    }
  }
}

pub struct ControllerDeps {
  pub store:     Rc<dyn DocumentStore>,
  pub scheduler: Rc<dyn IntervalScheduler>,
  pub navigator: Rc<dyn Navigator>,
  pub session:   SessionResolver,
  pub settings:  ControllerSettings
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  /// The store accepted the delete; the
  /// list refreshes through the next
  /// snapshot.
  Requested,
  Failed,
  /// The controller was not mounted when
  /// the request was made or answered.
  Discarded
}

struct ViewState {
  tasks:              Vec<TaskDto>,
  active_filter:      TaskFilter,
  generation:         u64,
  carousel:           Carousel,
  subscription_fault: Option<DeckError>
}

impl ViewState {
  fn working_set(&self) -> Vec<TaskDto> {
    working_set(
      &self.tasks,
      self.active_filter
    )
  }

  fn working_len(&self) -> usize {
    self
      .tasks
      .iter()
      .filter(|task| {
        self.active_filter.matches(&task.status)
      })
      .count()
  }
}

struct ControllerInner {
  store:        Rc<dyn DocumentStore>,
  scheduler:    Rc<dyn IntervalScheduler>,
  navigator:    Rc<dyn Navigator>,
  session:      SessionResolver,
  settings:     ControllerSettings,
  state:        RefCell<ViewState>,
  alive:        Cell<bool>,
  subscription: RefCell<Option<Subscription>>,
  timer:        RefCell<CarouselTimer>,
  listener:     RefCell<Option<Rc<dyn Fn()>>>
}

/// View state behind the task dashboard.
///
/// The cached task list is a mirror of
/// the latest snapshot and is only ever
/// replaced wholesale. Everything shown
/// (working set, carousel items, title)
/// is derived from it and the active
/// filter on read.
#[derive(Clone)]
pub struct TaskViewController {
  inner: Rc<ControllerInner>
}

impl TaskViewController {
  pub fn new(deps: ControllerDeps) -> Self {
    let carousel =
      Carousel::new(deps.settings.window);
    Self {
      inner: Rc::new(ControllerInner {
        store:        deps.store,
        scheduler:    deps.scheduler,
        navigator:    deps.navigator,
        session:      deps.session,
        settings:     deps.settings,
        state:        RefCell::new(ViewState {
          tasks: Vec::new(),
          active_filter: TaskFilter::default(),
          generation: 0,
          carousel,
          subscription_fault: None
        }),
        alive:        Cell::new(false),
        subscription: RefCell::new(None),
        timer:        RefCell::new(
          CarouselTimer::new()
        ),
        listener:     RefCell::new(None)
      })
    }
  }

  pub fn set_listener(
    &self,
    listener: impl Fn() + 'static
  ) {
    *self.inner.listener.borrow_mut() =
      Some(Rc::new(listener));
  }

  /// Opens the single live subscription
  /// for this mount.
  #[tracing::instrument(skip(self), fields(collection = %self.inner.settings.collection))]
  pub fn mount(&self) {
    if self.inner.alive.replace(true) {
      warn!(
        "task view already mounted; \
         keeping existing subscription"
      );
      return;
    }

    // Nothing survives from an earlier
    // mount; the list stays empty until
    // the first snapshot.
    {
      let mut state =
        self.inner.state.borrow_mut();
      let generation = state.generation + 1;
      *state = ViewState {
        tasks: Vec::new(),
        active_filter: TaskFilter::default(),
        generation,
        carousel: Carousel::new(
          self.inner.settings.window
        ),
        subscription_fault: None
      };
    }

    let on_snapshot = {
      let weak = Rc::downgrade(&self.inner);
      Box::new(
        move |docs: Vec<TaskDocument>| {
          if let Some(inner) = weak.upgrade()
          {
            ControllerInner::apply_snapshot(
              &inner, &docs
            );
          }
        }
      )
    };
    let on_error = {
      let weak = Rc::downgrade(&self.inner);
      Box::new(move |err: DeckError| {
        if let Some(inner) = weak.upgrade() {
          ControllerInner::record_fault(
            &inner, err
          );
        }
      })
    };

    let subscription =
      self.inner.store.subscribe(
        &self.inner.settings.collection,
        on_snapshot,
        on_error
      );
    *self.inner.subscription.borrow_mut() =
      Some(subscription);
    info!("task subscription opened");
  }

  /// Releases the subscription and the
  /// carousel timer. Snapshots, ticks and
  /// delete results arriving afterwards
  /// are ignored.
  pub fn unmount(&self) {
    self.inner.alive.set(false);
    let subscription = self
      .inner
      .subscription
      .borrow_mut()
      .take();
    if let Some(subscription) = subscription {
      subscription.unsubscribe();
    }
    self.inner.timer.borrow_mut().stop();
    info!("task subscription released");
  }

  pub fn is_mounted(&self) -> bool {
    self.inner.alive.get()
  }

  pub fn set_filter(
    &self,
    filter: TaskFilter
  ) {
    {
      let mut state =
        self.inner.state.borrow_mut();
      if state.active_filter == filter {
        return;
      }
      state.active_filter = filter;
      state.generation += 1;
      debug!(
        filter = filter.as_key(),
        generation = state.generation,
        "filter changed"
      );
    }
    ControllerInner::rearm_carousel(
      &self.inner
    );
    notify(&self.inner.listener);
  }

  pub fn active_filter(&self) -> TaskFilter {
    self.inner.state.borrow().active_filter
  }

  pub fn tasks(&self) -> Vec<TaskDto> {
    self.inner.state.borrow().tasks.clone()
  }

  pub fn working_set(&self) -> Vec<TaskDto> {
    self.inner.state.borrow().working_set()
  }

  /// Leading items of the working set
  /// shown in the carousel.
  pub fn carousel_items(
    &self
  ) -> Vec<TaskDto> {
    let state = self.inner.state.borrow();
    let working = state.working_set();
    state.carousel.visible(&working).to_vec()
  }

  pub fn carousel_index(&self) -> usize {
    let state = self.inner.state.borrow();
    state.carousel.index(state.working_len())
  }

  pub fn carousel_animation(
    &self
  ) -> MarqueeAnimation {
    MarqueeAnimation::ping_pong(
      self.inner.settings.interval
    )
  }

  pub fn is_carousel_running(&self) -> bool {
    self.inner.timer.borrow().is_running()
  }

  /// Identity of the current working
  /// set; bumped by every snapshot and
  /// every filter switch.
  pub fn generation(&self) -> u64 {
    self.inner.state.borrow().generation
  }

  pub fn section_title(
    &self
  ) -> &'static str {
    section_title(self.active_filter())
  }

  pub fn session(&self) -> SessionResolver {
    self.inner.session.clone()
  }

  pub fn display_name(&self) -> String {
    self.inner.session.display_name()
  }

  pub fn greeting(&self) -> String {
    format!("Hello {}!", self.display_name())
  }

  pub fn subscription_fault(
    &self
  ) -> Option<DeckError> {
    self
      .inner
      .state
      .borrow()
      .subscription_fault
      .clone()
  }

  pub fn select_task(&self, id: &str) {
    debug!(id, "task selected");
    self
      .inner
      .navigator
      .navigate(Route::EditTask(id.to_string()));
  }

  pub fn add_task(&self) {
    self.inner.navigator.navigate(Route::AddTask);
  }

  /// Asks the store to delete `id`. The
  /// cached list is left alone either
  /// way; a successful delete shows up
  /// through the subscription.
  pub async fn delete_task(
    &self,
    id: &str
  ) -> DeleteOutcome {
    if !self.inner.alive.get() {
      warn!(id, "delete requested on unmounted task view");
      return DeleteOutcome::Discarded;
    }

    let result = self
      .inner
      .store
      .delete_document(
        &self.inner.settings.collection,
        id
      )
      .await;

    if !self.inner.alive.get() {
      debug!(id, "delete finished after unmount; result dropped");
      return DeleteOutcome::Discarded;
    }

    match result {
      | Ok(()) => {
        info!(id, "task delete accepted");
        DeleteOutcome::Requested
      }
      | Err(err) => {
        error!(id, error = %err, "error deleting task");
        DeleteOutcome::Failed
      }
    }
  }
}

impl ControllerInner {
  fn apply_snapshot(
    inner: &Rc<ControllerInner>,
    docs: &[TaskDocument]
  ) {
    if !inner.alive.get() {
      debug!(
        documents = docs.len(),
        "snapshot after unmount ignored"
      );
      return;
    }
    {
      let mut state =
        inner.state.borrow_mut();
      state.tasks =
        tasks_from_snapshot(docs);
      state.generation += 1;
      state.subscription_fault = None;
      debug!(
        tasks = state.tasks.len(),
        generation = state.generation,
        "snapshot applied"
      );
    }
    Self::rearm_carousel(inner);
    notify(&inner.listener);
  }

  fn record_fault(
    inner: &Rc<ControllerInner>,
    err: DeckError
  ) {
    if !inner.alive.get() {
      return;
    }
    error!(error = %err, "task subscription error; keeping last snapshot");
    inner.state.borrow_mut().subscription_fault =
      Some(err);
  }

  /// Replaces the carousel timer with one
  /// bound to the current generation, or
  /// stops it when there is nothing to
  /// rotate.
  fn rearm_carousel(
    inner: &Rc<ControllerInner>
  ) {
    let (len, generation) = {
      let state = inner.state.borrow();
      (state.working_len(), state.generation)
    };

    let mut timer = inner.timer.borrow_mut();
    if !inner.alive.get() || len == 0 {
      timer.stop();
      return;
    }

    let weak: Weak<ControllerInner> =
      Rc::downgrade(inner);
    timer.start(
      inner.scheduler.as_ref(),
      inner.settings.interval,
      generation,
      Box::new(move || {
        if let Some(inner) = weak.upgrade() {
          Self::tick(&inner, generation);
        }
      })
    );
  }

  fn tick(
    inner: &Rc<ControllerInner>,
    generation: u64
  ) {
    if !inner.alive.get() {
      return;
    }
    {
      let mut state =
        inner.state.borrow_mut();
      if state.generation != generation {
        debug!(
          stale = generation,
          current = state.generation,
          "stale carousel tick ignored"
        );
        return;
      }
      let len = state.working_len();
      state.carousel.advance(len);
    }
    notify(&inner.listener);
  }
}
