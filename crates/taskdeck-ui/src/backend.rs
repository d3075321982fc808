use std::rc::Rc;

use serde_json::json;
use taskdeck_core::config::{
  Backend as BackendKind,
  DeckConfig,
  overrides_from_query
};
use taskdeck_core::memory::{
  MemoryDocumentStore,
  MemoryIdentityProvider
};
use taskdeck_core::ports::{
  DocumentStore,
  IdentityProvider
};
use taskdeck_shared::{
  Principal,
  STATUS_COMPLETED,
  STATUS_IN_PROGRESS
};

use crate::firebase::{
  self,
  FirebaseIdentity,
  FirestoreStore
};

const BUNDLED_CONFIG: &str =
  include_str!("../assets/taskdeck.toml");

/// Services shared by every page through
/// the context provider.
#[derive(Clone)]
pub struct Backend {
  pub config:   Rc<DeckConfig>,
  pub identity: Rc<dyn IdentityProvider>,
  pub store:    Rc<dyn DocumentStore>
}

impl PartialEq for Backend {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.config, &other.config)
  }
}

impl Backend {
  pub fn load() -> Self {
    Self::from_config(load_config())
  }

  pub fn from_config(
    config: DeckConfig
  ) -> Self {
    match config.store.backend {
      | BackendKind::Firebase => {
        match firebase::init(&config.firebase)
        {
          | Ok(()) => {
            Self {
              config:   Rc::new(config),
              identity: Rc::new(
                FirebaseIdentity
              ),
              store:    Rc::new(
                FirestoreStore
              )
            }
          }
          | Err(err) => {
            tracing::error!(
              error = %err,
              "firebase unavailable; \
               using in-memory backend"
            );
            Self::memory(config)
          }
        }
      }
      | BackendKind::Memory => {
        Self::memory(config)
      }
    }
  }

  fn memory(config: DeckConfig) -> Self {
    let store = MemoryDocumentStore::new();
    seed_demo_tasks(
      &store,
      &config.store.collection
    );
    let identity =
      MemoryIdentityProvider::with_demo_principal(
        Principal::named(
          "demo", "Demo User"
        )
      );
    tracing::info!(
      collection = %config.store.collection,
      "in-memory backend ready"
    );
    Self {
      config:   Rc::new(config),
      identity: Rc::new(identity),
      store:    Rc::new(store)
    }
  }
}

fn load_config() -> DeckConfig {
  let mut cfg =
    match DeckConfig::from_toml_str(
      BUNDLED_CONFIG
    ) {
      | Ok(cfg) => cfg,
      | Err(err) => {
        tracing::error!(
          error = %format!("{err:#}"),
          "bundled config rejected; \
           using defaults"
        );
        DeckConfig::default()
      }
    };

  let query = web_sys::window()
    .and_then(|window| {
      window.location().search().ok()
    })
    .unwrap_or_default();
  let overrides =
    overrides_from_query(&query);
  if overrides.is_empty() {
    return cfg;
  }

  let fallback = cfg.clone();
  if let Err(err) =
    cfg.apply_overrides(overrides)
  {
    tracing::error!(
      error = %format!("{err:#}"),
      "query overrides rejected"
    );
    return fallback;
  }
  cfg
}

fn seed_demo_tasks(
  store: &MemoryDocumentStore,
  collection: &str
) {
  let demo = [
    (
      "Plan sprint",
      "Pick the next batch of stories",
      "2026-10-20",
      STATUS_IN_PROGRESS
    ),
    (
      "Review pull requests",
      "Two open reviews on the API",
      "2026-10-19",
      STATUS_IN_PROGRESS
    ),
    (
      "Write release notes",
      "",
      "2026-10-22",
      STATUS_IN_PROGRESS
    ),
    (
      "Set up CI cache",
      "Shared target dir between jobs",
      "2026-10-12",
      STATUS_COMPLETED
    ),
    (
      "Sketch onboarding flow",
      "",
      "",
      "todo"
    )
  ];
  for (title, description, due, status) in
    demo
  {
    store.insert(
      collection,
      json!({
        "title": title,
        "description": description,
        "dueDate": due,
        "status": status
      })
    );
  }
}
