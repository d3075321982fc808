use std::cell::{
  Cell,
  RefCell
};
use std::rc::Rc;

use taskdeck_shared::Principal;
use tracing::{
  debug,
  error,
  info,
  warn
};

use crate::ports::{
  IdentityProvider,
  Navigator,
  Subscription
};
use crate::route::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
  /// A principal came back and the
  /// dashboard navigation was issued.
  SignedIn(Principal),
  /// A principal came back but this
  /// resolver had already navigated.
  AlreadyHandled(Principal),
  NoPendingResult,
  Failed,
  /// The resolver was unmounted before
  /// the provider answered.
  Discarded
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
  Started,
  Failed
}

#[derive(Debug, Clone, Default)]
struct SessionState {
  principal:    Option<Principal>,
  display_name: String
}

struct SessionInner {
  identity:           Rc<dyn IdentityProvider>,
  navigator:          Rc<dyn Navigator>,
  fallback:           String,
  state:              RefCell<SessionState>,
  alive:              Cell<bool>,
  observer:           RefCell<Option<Subscription>>,
  redirect_navigated: Cell<bool>,
  listener:           RefCell<Option<Rc<dyn Fn()>>>
}

/// Tracks who is signed in and what the
/// greeting should call them.
///
/// Two independent signals feed it: the
/// ambient auth observer (registered by
/// `mount`) and a one-shot redirect check
/// (`resolve_redirect`). Only the latter
/// ever navigates, and at most once per
/// resolver.
#[derive(Clone)]
pub struct SessionResolver {
  inner: Rc<SessionInner>
}

impl SessionResolver {
  pub fn new(
    identity: Rc<dyn IdentityProvider>,
    navigator: Rc<dyn Navigator>,
    fallback_display_name: &str
  ) -> Self {
    let fallback =
      fallback_display_name.to_string();
    Self {
      inner: Rc::new(SessionInner {
        identity,
        navigator,
        state: RefCell::new(SessionState {
          principal:    None,
          display_name: fallback.clone()
        }),
        fallback,
        alive: Cell::new(false),
        observer: RefCell::new(None),
        redirect_navigated: Cell::new(false),
        listener: RefCell::new(None)
      })
    }
  }

  /// Called after every state change the
  /// view should re-render for.
  pub fn set_listener(
    &self,
    listener: impl Fn() + 'static
  ) {
    *self.inner.listener.borrow_mut() =
      Some(Rc::new(listener));
  }

  pub fn mount(&self) {
    if self.inner.alive.replace(true) {
      warn!(
        "session resolver already \
         mounted; ignoring"
      );
      return;
    }

    let weak = Rc::downgrade(&self.inner);
    let subscription = self
      .inner
      .identity
      .observe_auth_state(Box::new(
        move |principal| {
          if let Some(inner) = weak.upgrade()
          {
            SessionInner::apply_principal(
              &inner, principal
            );
          }
        }
      ));
    *self.inner.observer.borrow_mut() =
      Some(subscription);
    debug!("session observer registered");
  }

  pub fn unmount(&self) {
    self.inner.alive.set(false);
    let observer =
      self.inner.observer.borrow_mut().take();
    if let Some(subscription) = observer {
      subscription.unsubscribe();
    }
    debug!("session resolver unmounted");
  }

  pub fn is_mounted(&self) -> bool {
    self.inner.alive.get()
  }

  pub fn principal(
    &self
  ) -> Option<Principal> {
    self.inner.state.borrow().principal.clone()
  }

  pub fn is_authenticated(&self) -> bool {
    self.inner.state.borrow().principal.is_some()
  }

  pub fn display_name(&self) -> String {
    self
      .inner
      .state
      .borrow()
      .display_name
      .clone()
  }

  /// Checks once for a completed
  /// redirect sign-in. On success the
  /// principal becomes the session and
  /// the dashboard is requested. Results
  /// reaching an unmounted resolver are
  /// discarded.
  pub async fn resolve_redirect(
    &self
  ) -> RedirectOutcome {
    // The provider hands a redirect result
    // out only once; leave it for a mounted
    // resolver.
    if !self.inner.alive.get() {
      debug!(
        "redirect check on unmounted \
         resolver skipped"
      );
      return RedirectOutcome::Discarded;
    }

    let result = self
      .inner
      .identity
      .pending_redirect_result()
      .await;

    if !self.inner.alive.get() {
      debug!(
        "redirect result arrived after \
         unmount; dropped"
      );
      return RedirectOutcome::Discarded;
    }

    match result {
      | Ok(Some(principal)) => {
        SessionInner::apply_principal(
          &self.inner,
          Some(principal.clone())
        );
        if self
          .inner
          .redirect_navigated
          .replace(true)
        {
          return RedirectOutcome::AlreadyHandled(
            principal
          );
        }
        info!(uid = %principal.uid, "redirect sign-in completed");
        self
          .inner
          .navigator
          .navigate(Route::Dashboard);
        RedirectOutcome::SignedIn(principal)
      }
      | Ok(None) => {
        debug!("no pending redirect result");
        RedirectOutcome::NoPendingResult
      }
      | Err(err) => {
        error!(error = %err, "redirect sign-in failed");
        RedirectOutcome::Failed
      }
    }
  }

  pub async fn begin_sign_in(
    &self
  ) -> SignInOutcome {
    match self
      .inner
      .identity
      .begin_redirect_sign_in()
      .await
    {
      | Ok(()) => {
        info!("redirect sign-in started");
        SignInOutcome::Started
      }
      | Err(err) => {
        error!(error = %err, "could not start sign-in");
        SignInOutcome::Failed
      }
    }
  }
}

impl SessionInner {
  fn apply_principal(
    inner: &Rc<SessionInner>,
    principal: Option<Principal>
  ) {
    if !inner.alive.get() {
      return;
    }
    {
      let mut state =
        inner.state.borrow_mut();
      state.display_name = principal
        .as_ref()
        .and_then(Principal::display_name)
        .unwrap_or(&inner.fallback)
        .to_string();
      state.principal = principal;
      debug!(
        display_name = %state.display_name,
        authenticated = state.principal.is_some(),
        "session updated"
      );
    }
    notify(&inner.listener);
  }
}

pub(crate) fn notify(
  listener: &RefCell<Option<Rc<dyn Fn()>>>
) {
  let listener = listener.borrow().clone();
  if let Some(listener) = listener {
    listener();
  }
}
