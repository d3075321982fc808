use taskdeck_core::SignInOutcome;
use wasm_bindgen_futures::spawn_local;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_context,
  use_effect_with,
  use_force_update,
  use_memo
};
use yew_router::prelude::use_navigator;

use super::session_for;
use crate::backend::Backend;
use crate::diagnostics::ui_debug;

#[function_component(WelcomePage)]
pub fn welcome_page() -> Html {
  let backend = use_context::<Backend>();
  let navigator = use_navigator();
  let session = use_memo(
    (backend, navigator),
    |(backend, navigator)| {
      match (backend, navigator) {
        | (Some(backend), Some(navigator)) => {
          Some(session_for(
            backend,
            navigator.clone()
          ))
        }
        | _ => None
      }
    }
  );
  let redraw = use_force_update();

  {
    let session = (*session).clone();
    use_effect_with((), move |_| {
      if let Some(session) = &session {
        session.set_listener(move || {
          redraw.force_update()
        });
        session.mount();
        let resolving = session.clone();
        spawn_local(async move {
          let outcome =
            resolving.resolve_redirect().await;
          ui_debug(
            "redirect",
            &format!("{outcome:?}")
          );
        });
      } else {
        tracing::error!(
          "welcome page rendered outside \
           backend or router"
        );
      }
      move || {
        if let Some(session) = session {
          session.unmount();
        }
      }
    });
  }

  let on_sign_in = {
    let session = (*session).clone();
    Callback::from(move |_| {
      if let Some(session) = session.clone() {
        spawn_local(async move {
          let outcome =
            session.begin_sign_in().await;
          ui_debug(
            "sign-in",
            &format!("{outcome:?}")
          );
          // Providers that complete without
          // leaving the page have a result
          // waiting already.
          if outcome == SignInOutcome::Started {
            let outcome =
              session.resolve_redirect().await;
            ui_debug(
              "redirect",
              &format!("{outcome:?}")
            );
          }
        });
      }
    })
  };

  html! {
      <div class="welcome">
          <h1>{ "Taskdeck" }</h1>
          <p class="lead">{ "Manage your tasks with ease." }</p>
          <p class="tagline">{ "Keep track of what is in progress and what is done." }</p>
          <button class="btn primary" onclick={on_sign_in}>
              { "Sign in with Google" }
          </button>
      </div>
  }
}
