//! Seams to the external collaborators:
//! the identity provider, the document
//! store, navigation and the interval
//! timer. Everything runs on one event
//! loop, so none of these require
//! `Send`.

use std::fmt;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use taskdeck_shared::{
  Principal,
  TaskDocument
};

use crate::error::DeckError;
use crate::route::Route;

pub type DeckFuture<T> = LocalBoxFuture<
  'static,
  Result<T, DeckError>
>;

pub type AuthCallback =
  Box<dyn FnMut(Option<Principal>)>;
pub type SnapshotCallback =
  Box<dyn FnMut(Vec<TaskDocument>)>;
pub type ErrorCallback =
  Box<dyn FnMut(DeckError)>;
pub type TickCallback = Box<dyn FnMut()>;

/// Owned teardown for a listener or a
/// timer. The teardown runs exactly once,
/// on `unsubscribe` or on drop.
#[must_use = "dropping a subscription \
              releases it immediately"]
pub struct Subscription {
  teardown: Option<Box<dyn FnOnce()>>
}

impl Subscription {
  pub fn new(
    teardown: impl FnOnce() + 'static
  ) -> Self {
    Self {
      teardown: Some(Box::new(teardown))
    }
  }

  pub fn noop() -> Self {
    Self { teardown: None }
  }

  pub fn unsubscribe(mut self) {
    self.release();
  }

  fn release(&mut self) {
    if let Some(teardown) =
      self.teardown.take()
    {
      teardown();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.release();
  }
}

impl fmt::Debug for Subscription {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("Subscription")
      .field(
        "active",
        &self.teardown.is_some()
      )
      .finish()
  }
}

pub trait IdentityProvider {
  /// Registers a continuous observer of
  /// the signed-in principal. `None`
  /// means signed out.
  fn observe_auth_state(
    &self,
    on_change: AuthCallback
  ) -> Subscription;

  fn begin_redirect_sign_in(
    &self
  ) -> DeckFuture<()>;

  fn pending_redirect_result(
    &self
  ) -> DeckFuture<Option<Principal>>;
}

pub trait DocumentStore {
  /// Opens a live listener on a
  /// collection. Every emission is the
  /// complete, ordered collection.
  fn subscribe(
    &self,
    collection: &str,
    on_snapshot: SnapshotCallback,
    on_error: ErrorCallback
  ) -> Subscription;

  fn delete_document(
    &self,
    collection: &str,
    id: &str
  ) -> DeckFuture<()>;
}

pub trait Navigator {
  fn navigate(&self, route: Route);
}

pub trait IntervalScheduler {
  fn every(
    &self,
    period: Duration,
    tick: TickCallback
  ) -> Subscription;
}
