mod common;

use std::cell::{
  Cell,
  RefCell
};
use std::rc::Rc;

use common::{
  COLLECTION,
  Harness,
  INTERVAL,
  RecordingNavigator
};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::block_on;
use serde_json::json;
use taskdeck_core::controller::{
  ControllerDeps,
  ControllerSettings
};
use taskdeck_core::memory::MemoryIdentityProvider;
use taskdeck_core::ports::{
  DeckFuture,
  DocumentStore,
  ErrorCallback,
  SnapshotCallback,
  Subscription
};
use taskdeck_core::route::Route;
use taskdeck_core::schedule::ManualScheduler;
use taskdeck_core::{
  DeckError,
  DeleteOutcome,
  Principal,
  SessionResolver,
  TaskDocument,
  TaskFilter,
  TaskViewController
};

#[test]
fn snapshot_populates_filtered_working_set() {
  let h = Harness::new();
  for (id, status) in [
    ("1", "in-progress"),
    ("2", "completed"),
    ("3", "todo"),
    ("4", "completed"),
    ("5", "in-progress")
  ] {
    h.seed(id, status);
  }

  h.controller.mount();
  assert_eq!(h.controller.tasks().len(), 5);
  assert_eq!(
    h.controller.active_filter(),
    TaskFilter::MyTasks
  );
  assert_eq!(
    h.working_ids(),
    ["1", "2", "4", "5"]
  );
  assert_eq!(
    h.controller.section_title(),
    "My Tasks"
  );

  h.controller.set_filter(TaskFilter::Completed);
  assert_eq!(h.working_ids(), ["2", "4"]);
  assert_eq!(
    h.controller.section_title(),
    "Completed"
  );
}

#[test]
fn carousel_rotates_over_leading_three() {
  let h = Harness::new();
  for id in ["a", "b", "c", "d", "e"] {
    h.seed(id, "in-progress");
  }
  h.controller.mount();

  let visible: Vec<String> = h
    .controller
    .carousel_items()
    .into_iter()
    .map(|task| task.id)
    .collect();
  assert_eq!(visible, ["a", "b", "c"]);
  assert!(h.controller.is_carousel_running());

  for k in 1..=7 {
    h.scheduler.advance(INTERVAL);
    assert_eq!(
      h.controller.carousel_index(),
      k % 3
    );
    assert_eq!(
      h.controller.carousel_items().len(),
      3
    );
  }
  assert_eq!(
    h.controller.carousel_items()[0].id,
    "a"
  );
}

#[test]
fn small_working_set_wraps_on_its_size() {
  let h = Harness::new();
  h.seed("a", "completed");
  h.seed("b", "completed");
  h.controller.mount();

  let fired = h.scheduler.advance(INTERVAL * 5);

  assert_eq!(fired, 5);
  assert_eq!(h.controller.carousel_index(), 1);
}

#[test]
fn empty_working_set_never_ticks() {
  let h = Harness::new();
  h.seed("x", "todo");
  h.controller.mount();

  assert!(h.controller.working_set().is_empty());
  assert!(!h.controller.is_carousel_running());
  assert_eq!(h.scheduler.active_timers(), 0);
  assert_eq!(
    h.scheduler.advance(INTERVAL * 3),
    0
  );
  assert_eq!(h.controller.carousel_index(), 0);
}

#[test]
fn working_set_changes_rearm_the_timer() {
  let h = Harness::new();
  h.seed("a", "in-progress");
  h.seed("b", "completed");
  h.controller.mount();

  let before = h.controller.generation();
  h.scheduler.advance(INTERVAL / 2);
  h.controller.set_filter(TaskFilter::InProgress);

  assert!(h.controller.generation() > before);
  assert_eq!(h.scheduler.active_timers(), 1);
  // The re-armed timer starts a fresh
  // period from the switch.
  assert_eq!(
    h.scheduler.advance(INTERVAL / 2),
    0
  );
  assert_eq!(h.scheduler.advance(INTERVAL / 2), 1);

  h.controller.set_filter(TaskFilter::InProgress);
  assert_eq!(h.scheduler.active_timers(), 1);

  h.controller.set_filter(TaskFilter::Completed);
  h.store.update_status(COLLECTION, "b", "todo");
  assert!(h.controller.working_set().is_empty());
  assert!(!h.controller.is_carousel_running());
}

#[test]
fn snapshot_under_in_progress_filter_drops_stale_entries() {
  let h = Harness::new();
  h.seed("a", "in-progress");
  h.seed("b", "in-progress");
  h.controller.mount();
  h.controller.set_filter(TaskFilter::InProgress);
  assert_eq!(h.working_ids(), ["a", "b"]);

  h.store.update_status(COLLECTION, "a", "completed");

  assert_eq!(h.working_ids(), ["b"]);
  assert_eq!(
    h.controller.section_title(),
    "In-progress"
  );
}

#[test]
fn delete_refreshes_through_the_subscription() {
  let h = Harness::new();
  h.seed("a", "in-progress");
  h.seed("b", "completed");
  h.controller.mount();

  let outcome =
    block_on(h.controller.delete_task("a"));

  assert_eq!(outcome, DeleteOutcome::Requested);
  assert_eq!(h.working_ids(), ["b"]);
}

#[test]
fn deleting_unknown_id_keeps_tasks() {
  let h = Harness::new();
  h.seed("a", "in-progress");
  h.controller.mount();
  let generation = h.controller.generation();

  let outcome = block_on(
    h.controller.delete_task("missing")
  );

  assert_eq!(outcome, DeleteOutcome::Requested);
  assert_eq!(h.working_ids(), ["a"]);
  assert_eq!(h.controller.generation(), generation);
}

#[test]
fn failed_delete_leaves_list_unchanged() {
  let h = Harness::new();
  h.seed("a", "in-progress");
  h.controller.mount();
  h.store.fail_deletes(Some("permission-denied"));

  let outcome =
    block_on(h.controller.delete_task("a"));

  assert_eq!(outcome, DeleteOutcome::Failed);
  assert_eq!(h.working_ids(), ["a"]);
}

#[test]
fn selection_and_create_navigate() {
  let h = Harness::new();
  h.controller.select_task("abc");
  h.controller.add_task();

  assert_eq!(
    h.navigator.routes(),
    vec![
      Route::EditTask("abc".to_string()),
      Route::AddTask
    ]
  );
}

#[test]
fn greeting_follows_session() {
  let h = Harness::new();
  h.session.mount();
  assert_eq!(h.controller.greeting(), "Hello User!");

  h.identity
    .sign_in(Principal::named("u1", "Grace"));
  assert_eq!(
    h.controller.greeting(),
    "Hello Grace!"
  );
}

#[test]
fn double_mount_keeps_one_subscription() {
  let h = Harness::new();
  h.controller.mount();
  h.controller.mount();

  assert_eq!(h.store.subscriber_count(COLLECTION), 1);

  h.controller.unmount();
  assert_eq!(h.store.subscriber_count(COLLECTION), 0);
}

#[test]
fn unmount_releases_listener_and_timer() {
  let h = Harness::new();
  h.seed("a", "in-progress");
  h.controller.mount();
  let renders = Rc::new(Cell::new(0));
  {
    let renders = renders.clone();
    h.controller.set_listener(move || {
      renders.set(renders.get() + 1)
    });
  }

  h.controller.unmount();
  h.seed("b", "in-progress");
  h.scheduler.advance(INTERVAL * 3);

  assert_eq!(h.store.subscriber_count(COLLECTION), 0);
  assert_eq!(h.scheduler.active_timers(), 0);
  assert_eq!(renders.get(), 0);
  assert_eq!(h.working_ids(), ["a"]);
}

#[test]
fn remount_starts_from_fresh_view_state() {
  let h = Harness::new();
  for id in ["a", "b", "c"] {
    h.seed(id, "in-progress");
  }
  h.controller.mount();
  h.controller.set_filter(TaskFilter::Completed);
  h.controller.set_filter(TaskFilter::InProgress);
  h.scheduler.advance(INTERVAL * 2);
  assert_eq!(h.controller.carousel_index(), 2);

  h.controller.unmount();
  h.controller.mount();

  assert_eq!(
    h.controller.active_filter(),
    TaskFilter::MyTasks
  );
  assert_eq!(h.controller.carousel_index(), 0);
  assert_eq!(h.working_ids(), ["a", "b", "c"]);
  assert_eq!(h.store.subscriber_count(COLLECTION), 1);
}

#[test]
fn subscription_failure_is_recorded_not_raised() {
  let h = Harness::new();
  h.seed("a", "in-progress");
  h.store.fail_subscriptions(Some("unavailable"));

  h.controller.mount();

  assert!(h.controller.tasks().is_empty());
  assert_eq!(
    h.controller.subscription_fault(),
    Some(DeckError::Subscription(
      "unavailable".to_string()
    ))
  );
}

/// Store that never lets go of its
/// listener and holds deletes open until
/// the test releases them.
#[derive(Default)]
struct StickyInner {
  callback:    RefCell<Option<SnapshotCallback>>,
  released:    Cell<usize>,
  delete_gate: RefCell<Option<oneshot::Receiver<()>>>
}

#[derive(Clone, Default)]
struct StickyStore {
  inner: Rc<StickyInner>
}

impl StickyStore {
  fn push(&self, docs: Vec<TaskDocument>) {
    if let Some(callback) =
      self.inner.callback.borrow_mut().as_mut()
    {
      callback(docs);
    }
  }

  fn released(&self) -> usize {
    self.inner.released.get()
  }

  fn hold_next_delete(
    &self,
    gate: oneshot::Receiver<()>
  ) {
    *self.inner.delete_gate.borrow_mut() =
      Some(gate);
  }
}

impl DocumentStore for StickyStore {
  fn subscribe(
    &self,
    _collection: &str,
    on_snapshot: SnapshotCallback,
    _on_error: ErrorCallback
  ) -> Subscription {
    *self.inner.callback.borrow_mut() =
      Some(on_snapshot);
    let inner = self.inner.clone();
    Subscription::new(move || {
      inner.released.set(inner.released.get() + 1)
    })
  }

  fn delete_document(
    &self,
    _collection: &str,
    id: &str
  ) -> DeckFuture<()> {
    let gate =
      self.inner.delete_gate.borrow_mut().take();
    let id = id.to_string();
    async move {
      match gate {
        | Some(gate) => gate.await.map_err(|_| {
          DeckError::Delete {
            id,
            reason: "gate dropped".to_string()
          }
        }),
        | None => Ok(())
      }
    }
    .boxed_local()
  }
}

fn sticky_controller(
  store: &StickyStore
) -> TaskViewController {
  common::init_tracing();
  let navigator =
    Rc::new(RecordingNavigator::default());
  let session = SessionResolver::new(
    Rc::new(MemoryIdentityProvider::new()),
    navigator.clone(),
    "User"
  );
  TaskViewController::new(ControllerDeps {
    store: Rc::new(store.clone()),
    scheduler: Rc::new(ManualScheduler::new()),
    navigator,
    session,
    settings: ControllerSettings {
      collection: COLLECTION.to_string(),
      interval:   INTERVAL,
      window:     3
    }
  })
}

fn doc(id: &str, status: &str) -> TaskDocument {
  TaskDocument {
    id:     id.to_string(),
    fields: json!({ "title": id, "status": status })
  }
}

#[test]
fn snapshot_after_teardown_has_no_effect() {
  let store = StickyStore::default();
  let controller = sticky_controller(&store);
  controller.mount();
  store.push(vec![doc("a", "in-progress")]);
  assert_eq!(controller.tasks().len(), 1);

  controller.unmount();
  assert_eq!(store.released(), 1);

  store.push(vec![
    doc("a", "in-progress"),
    doc("b", "completed"),
  ]);

  assert_eq!(controller.tasks().len(), 1);
  assert!(!controller.is_carousel_running());
}

#[test]
fn remount_waits_for_a_fresh_snapshot() {
  let store = StickyStore::default();
  let controller = sticky_controller(&store);
  controller.mount();
  store.push(vec![
    doc("a", "in-progress"),
    doc("b", "completed"),
  ]);
  let generation = controller.generation();

  controller.unmount();
  controller.mount();

  assert!(controller.tasks().is_empty());
  assert!(controller.carousel_items().is_empty());
  assert!(!controller.is_carousel_running());
  assert!(controller.generation() > generation);

  store.push(vec![doc("c", "in-progress")]);
  assert_eq!(controller.tasks().len(), 1);
  assert!(controller.is_carousel_running());
}

#[test]
fn delete_completing_after_unmount_is_discarded() {
  let store = StickyStore::default();
  let (release, gate) = oneshot::channel();
  store.hold_next_delete(gate);
  let controller = sticky_controller(&store);
  controller.mount();

  let mut pending =
    Box::pin(controller.delete_task("a"));
  block_on(async {
    assert!(
      futures::poll!(pending.as_mut())
        .is_pending()
    );
  });

  controller.unmount();
  release.send(()).expect("gate open");

  assert_eq!(
    block_on(pending),
    DeleteOutcome::Discarded
  );
  assert_eq!(
    block_on(controller.delete_task("b")),
    DeleteOutcome::Discarded
  );
}
