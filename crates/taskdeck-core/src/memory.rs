//! In-process backends. The UI runs on
//! these when `store.backend = "memory"`;
//! tests use them as deterministic fakes
//! with failure injection.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{
  Rc,
  Weak
};

use futures_util::FutureExt;
use serde_json::Value;
use taskdeck_shared::{
  Principal,
  TaskDocument
};
use tracing::{
  debug,
  info,
  warn
};
use uuid::Uuid;

use crate::error::DeckError;
use crate::ports::{
  AuthCallback,
  DeckFuture,
  DocumentStore,
  ErrorCallback,
  IdentityProvider,
  SnapshotCallback,
  Subscription
};

type SharedSnapshotCallback =
  Rc<RefCell<SnapshotCallback>>;

struct Listener {
  collection:  String,
  on_snapshot: SharedSnapshotCallback
}

#[derive(Default)]
struct StoreState {
  collections:
    BTreeMap<String, Vec<TaskDocument>>,
  listeners:       BTreeMap<u64, Listener>,
  next_listener:   u64,
  delete_failure:  Option<String>,
  listen_failure:  Option<String>
}

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
  state: Rc<RefCell<StoreState>>
}

impl MemoryDocumentStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a document under a fresh
  /// store-assigned id and returns it.
  pub fn insert(
    &self,
    collection: &str,
    fields: Value
  ) -> String {
    let id = Uuid::new_v4()
      .simple()
      .to_string();
    self.insert_with_id(
      collection, &id, fields
    );
    id
  }

  /// Adds or replaces the document `id`.
  /// A replaced document keeps its
  /// position.
  pub fn insert_with_id(
    &self,
    collection: &str,
    id: &str,
    fields: Value
  ) {
    {
      let mut state =
        self.state.borrow_mut();
      let docs = state
        .collections
        .entry(collection.to_string())
        .or_default();
      let doc = TaskDocument {
        id: id.to_string(),
        fields
      };
      match docs
        .iter_mut()
        .find(|existing| existing.id == id)
      {
        | Some(existing) => *existing = doc,
        | None => docs.push(doc)
      }
    }
    debug!(collection, id, "memory document written");
    self.emit(collection);
  }

  /// Rewrites the `status` field of an
  /// existing document. Returns false
  /// when the document does not exist.
  pub fn update_status(
    &self,
    collection: &str,
    id: &str,
    status: &str
  ) -> bool {
    let updated = {
      let mut state =
        self.state.borrow_mut();
      state
        .collections
        .get_mut(collection)
        .and_then(|docs| {
          docs
            .iter_mut()
            .find(|doc| doc.id == id)
        })
        .map(|doc| {
          if !doc.fields.is_object() {
            doc.fields = Value::Object(
              serde_json::Map::new()
            );
          }
          doc.fields["status"] =
            Value::String(
              status.to_string()
            );
        })
        .is_some()
    };
    if updated {
      self.emit(collection);
    }
    updated
  }

  pub fn documents(
    &self,
    collection: &str
  ) -> Vec<TaskDocument> {
    self
      .state
      .borrow()
      .collections
      .get(collection)
      .cloned()
      .unwrap_or_default()
  }

  pub fn subscriber_count(
    &self,
    collection: &str
  ) -> usize {
    self
      .state
      .borrow()
      .listeners
      .values()
      .filter(|listener| {
        listener.collection == collection
      })
      .count()
  }

  /// Makes every later delete fail with
  /// `reason`; `None` restores normal
  /// behavior.
  pub fn fail_deletes(
    &self,
    reason: Option<&str>
  ) {
    self.state.borrow_mut().delete_failure =
      reason.map(str::to_string);
  }

  /// Makes every later subscription
  /// report `reason` instead of data.
  pub fn fail_subscriptions(
    &self,
    reason: Option<&str>
  ) {
    self.state.borrow_mut().listen_failure =
      reason.map(str::to_string);
  }

  fn remove(
    &self,
    collection: &str,
    id: &str
  ) -> bool {
    let mut state =
      self.state.borrow_mut();
    let Some(docs) =
      state.collections.get_mut(collection)
    else {
      return false;
    };
    let before = docs.len();
    docs.retain(|doc| doc.id != id);
    docs.len() != before
  }

  fn emit(&self, collection: &str) {
    let (docs, callbacks) = {
      let state = self.state.borrow();
      let docs = state
        .collections
        .get(collection)
        .cloned()
        .unwrap_or_default();
      let callbacks: Vec<_> = state
        .listeners
        .values()
        .filter(|listener| {
          listener.collection == collection
        })
        .map(|listener| {
          listener.on_snapshot.clone()
        })
        .collect();
      (docs, callbacks)
    };

    for callback in callbacks {
      (callback.borrow_mut())(docs.clone());
    }
  }
}

impl DocumentStore for MemoryDocumentStore {
  fn subscribe(
    &self,
    collection: &str,
    on_snapshot: SnapshotCallback,
    mut on_error: ErrorCallback
  ) -> Subscription {
    let failure = self
      .state
      .borrow()
      .listen_failure
      .clone();
    if let Some(reason) = failure {
      warn!(collection, %reason, "memory subscription refused");
      on_error(DeckError::Subscription(
        reason
      ));
      return Subscription::noop();
    }

    let on_snapshot =
      Rc::new(RefCell::new(on_snapshot));
    let id = {
      let mut state =
        self.state.borrow_mut();
      let id = state.next_listener;
      state.next_listener += 1;
      state.listeners.insert(id, Listener {
        collection:  collection
          .to_string(),
        on_snapshot: on_snapshot.clone()
      });
      id
    };
    debug!(collection, listener = id, "memory listener attached");

    // Listeners get the current contents
    // right away, like a Firestore query
    // listener.
    let docs = self.documents(collection);
    (on_snapshot.borrow_mut())(docs);

    let weak: Weak<RefCell<StoreState>> =
      Rc::downgrade(&self.state);
    Subscription::new(move || {
      if let Some(state) = weak.upgrade() {
        state
          .borrow_mut()
          .listeners
          .remove(&id);
        debug!(listener = id, "memory listener detached");
      }
    })
  }

  fn delete_document(
    &self,
    collection: &str,
    id: &str
  ) -> DeckFuture<()> {
    let store = self.clone();
    let collection = collection.to_string();
    let id = id.to_string();
    async move {
      let failure = store
        .state
        .borrow()
        .delete_failure
        .clone();
      if let Some(reason) = failure {
        return Err(DeckError::Delete {
          id,
          reason
        });
      }
      if store.remove(&collection, &id) {
        info!(collection = %collection, id = %id, "memory document deleted");
        store.emit(&collection);
      } else {
        debug!(collection = %collection, id = %id, "delete of missing document");
      }
      Ok(())
    }
    .boxed_local()
  }
}

type SharedAuthCallback =
  Rc<RefCell<AuthCallback>>;

#[derive(Default)]
struct IdentityState {
  current:          Option<Principal>,
  observers:
    BTreeMap<u64, SharedAuthCallback>,
  next_observer:    u64,
  pending_redirect: Option<Principal>,
  redirect_failure: Option<String>,
  sign_in_as:       Option<Principal>
}

#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
  state: Rc<RefCell<IdentityState>>
}

impl MemoryIdentityProvider {
  pub fn new() -> Self {
    Self::default()
  }

  /// Provider whose redirect sign-in
  /// completes as `principal`.
  pub fn with_demo_principal(
    principal: Principal
  ) -> Self {
    let provider = Self::new();
    provider.state.borrow_mut().sign_in_as =
      Some(principal);
    provider
  }

  pub fn current(&self) -> Option<Principal> {
    self.state.borrow().current.clone()
  }

  pub fn sign_in(
    &self,
    principal: Principal
  ) {
    self.state.borrow_mut().current =
      Some(principal);
    self.notify();
  }

  pub fn sign_out(&self) {
    self.state.borrow_mut().current = None;
    self.notify();
  }

  /// Queues a principal for the next
  /// `pending_redirect_result` call.
  pub fn stage_redirect_result(
    &self,
    principal: Principal
  ) {
    self
      .state
      .borrow_mut()
      .pending_redirect = Some(principal);
  }

  pub fn fail_redirect(
    &self,
    reason: Option<&str>
  ) {
    self
      .state
      .borrow_mut()
      .redirect_failure =
      reason.map(str::to_string);
  }

  pub fn observer_count(&self) -> usize {
    self.state.borrow().observers.len()
  }

  fn notify(&self) {
    let (current, observers) = {
      let state = self.state.borrow();
      (
        state.current.clone(),
        state
          .observers
          .values()
          .cloned()
          .collect::<Vec<_>>()
      )
    };
    for observer in observers {
      (observer.borrow_mut())(
        current.clone()
      );
    }
  }
}

impl IdentityProvider
  for MemoryIdentityProvider
{
  fn observe_auth_state(
    &self,
    on_change: AuthCallback
  ) -> Subscription {
    let on_change =
      Rc::new(RefCell::new(on_change));
    let (id, current) = {
      let mut state =
        self.state.borrow_mut();
      let id = state.next_observer;
      state.next_observer += 1;
      state
        .observers
        .insert(id, on_change.clone());
      (id, state.current.clone())
    };

    (on_change.borrow_mut())(current);

    let weak: Weak<RefCell<IdentityState>> =
      Rc::downgrade(&self.state);
    Subscription::new(move || {
      if let Some(state) = weak.upgrade() {
        state
          .borrow_mut()
          .observers
          .remove(&id);
      }
    })
  }

  fn begin_redirect_sign_in(
    &self
  ) -> DeckFuture<()> {
    let provider = self.clone();
    async move {
      let (failure, principal) = {
        let state = provider.state.borrow();
        (
          state.redirect_failure.clone(),
          state.sign_in_as.clone()
        )
      };
      if let Some(reason) = failure {
        return Err(DeckError::Auth(reason));
      }
      let principal =
        principal.unwrap_or_default();
      info!(uid = %principal.uid, "memory redirect sign-in staged");
      provider
        .stage_redirect_result(principal);
      Ok(())
    }
    .boxed_local()
  }

  fn pending_redirect_result(
    &self
  ) -> DeckFuture<Option<Principal>> {
    let provider = self.clone();
    async move {
      let failure = provider
        .state
        .borrow()
        .redirect_failure
        .clone();
      if let Some(reason) = failure {
        return Err(DeckError::Auth(reason));
      }
      let pending = provider
        .state
        .borrow_mut()
        .pending_redirect
        .take();
      if let Some(principal) = &pending {
        provider.sign_in(principal.clone());
      }
      Ok(pending)
    }
    .boxed_local()
  }
}
