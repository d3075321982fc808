#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::json;
use taskdeck_core::controller::{
  ControllerDeps,
  ControllerSettings
};
use taskdeck_core::memory::{
  MemoryDocumentStore,
  MemoryIdentityProvider
};
use taskdeck_core::ports::Navigator;
use taskdeck_core::route::Route;
use taskdeck_core::schedule::ManualScheduler;
use taskdeck_core::{
  SessionResolver,
  TaskViewController
};

pub const COLLECTION: &str = "tasks";
pub const INTERVAL: Duration =
  Duration::from_secs(10);

pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
          tracing_subscriber::EnvFilter::new(
            "taskdeck_core=debug"
          )
        })
    )
    .with_test_writer()
    .try_init();
}

#[derive(Default)]
pub struct RecordingNavigator {
  pub routes: RefCell<Vec<Route>>
}

impl RecordingNavigator {
  pub fn routes(&self) -> Vec<Route> {
    self.routes.borrow().clone()
  }
}

impl Navigator for RecordingNavigator {
  fn navigate(&self, route: Route) {
    self.routes.borrow_mut().push(route);
  }
}

pub struct Harness {
  pub store:      MemoryDocumentStore,
  pub identity:   MemoryIdentityProvider,
  pub scheduler:  ManualScheduler,
  pub navigator:  Rc<RecordingNavigator>,
  pub session:    SessionResolver,
  pub controller: TaskViewController
}

impl Harness {
  pub fn new() -> Self {
    init_tracing();
    let store = MemoryDocumentStore::new();
    let identity =
      MemoryIdentityProvider::new();
    let scheduler = ManualScheduler::new();
    let navigator =
      Rc::new(RecordingNavigator::default());
    let session = SessionResolver::new(
      Rc::new(identity.clone()),
      navigator.clone(),
      "User"
    );
    let controller =
      TaskViewController::new(ControllerDeps {
        store:     Rc::new(store.clone()),
        scheduler: Rc::new(scheduler.clone()),
        navigator: navigator.clone(),
        session:   session.clone(),
        settings:  ControllerSettings {
          collection: COLLECTION.to_string(),
          interval:   INTERVAL,
          window:     3
        }
      });

    Self {
      store,
      identity,
      scheduler,
      navigator,
      session,
      controller
    }
  }

  pub fn seed(
    &self,
    id: &str,
    status: &str
  ) {
    self.store.insert_with_id(
      COLLECTION,
      id,
      json!({
        "title": format!("task {id}"),
        "description": "",
        "dueDate": "2026-10-31",
        "status": status
      })
    );
  }

  pub fn working_ids(&self) -> Vec<String> {
    self
      .controller
      .working_set()
      .into_iter()
      .map(|task| task.id)
      .collect()
  }
}
