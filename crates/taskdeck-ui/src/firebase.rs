use std::cell::RefCell;
use std::rc::Rc;

use futures_util::FutureExt;
use js_sys::Function;
use serde::Serialize;
use taskdeck_core::DeckError;
use taskdeck_core::config::FirebaseConfig;
use taskdeck_core::ports::{
  AuthCallback,
  DeckFuture,
  DocumentStore,
  ErrorCallback,
  IdentityProvider,
  SnapshotCallback,
  Subscription
};
use taskdeck_shared::{
  Principal,
  TaskDocument
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/firebase_bridge.js")]
extern "C" {
  #[wasm_bindgen(
    js_name = initFirebase,
    catch
  )]
  fn init_firebase(
    config: JsValue
  ) -> Result<(), JsValue>;

  #[wasm_bindgen(
    js_name = observeAuthState,
    catch
  )]
  fn observe_auth_state(
    on_change: &Closure<dyn FnMut(JsValue)>
  ) -> Result<Function, JsValue>;

  #[wasm_bindgen(
    js_name = beginRedirectSignIn,
    catch
  )]
  async fn begin_redirect_sign_in()
  -> Result<JsValue, JsValue>;

  #[wasm_bindgen(
    js_name = pendingRedirectResult,
    catch
  )]
  async fn pending_redirect_result()
  -> Result<JsValue, JsValue>;

  #[wasm_bindgen(
    js_name = subscribeCollection,
    catch
  )]
  fn subscribe_collection(
    name: &str,
    on_data: &Closure<dyn FnMut(JsValue)>,
    on_error: &Closure<dyn FnMut(JsValue)>
  ) -> Result<Function, JsValue>;

  #[wasm_bindgen(
    js_name = deleteDocument,
    catch
  )]
  async fn delete_document(
    name: &str,
    id: &str
  ) -> Result<JsValue, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SdkConfig<'a> {
  api_key:             &'a str,
  auth_domain:         &'a str,
  project_id:          &'a str,
  storage_bucket:      &'a str,
  messaging_sender_id: &'a str,
  app_id:              &'a str
}

/// Initializes the Firebase app. Must
/// succeed before either adapter is
/// built.
pub fn init(
  cfg: &FirebaseConfig
) -> Result<(), DeckError> {
  if cfg.project_id.trim().is_empty() {
    return Err(DeckError::Bridge(
      "firebase.project_id is empty"
        .to_string()
    ));
  }
  let sdk = SdkConfig {
    api_key:             &cfg.api_key,
    auth_domain:         &cfg.auth_domain,
    project_id:          &cfg.project_id,
    storage_bucket:      &cfg.storage_bucket,
    messaging_sender_id: &cfg
      .messaging_sender_id,
    app_id:              &cfg.app_id
  };
  let value =
    serde_wasm_bindgen::to_value(&sdk)
      .map_err(|e| {
        DeckError::Bridge(format!(
          "failed to encode config: {e}"
        ))
      })?;
  init_firebase(value).map_err(|e| {
    DeckError::Bridge(js_error_text(&e))
  })?;
  tracing::info!(
    project_id = %cfg.project_id,
    "firebase initialized"
  );
  Ok(())
}

fn js_error_text(
  value: &JsValue
) -> String {
  if let Some(text) = value.as_string() {
    return text;
  }
  if let Some(err) =
    value.dyn_ref::<js_sys::Error>()
  {
    return String::from(err.message());
  }
  format!("{value:?}")
}

/// Teardown that calls the JS
/// unsubscribe function and then drops
/// the closures it was holding on to.
fn js_subscription(
  unsubscribe: Function,
  closures: Vec<Closure<dyn FnMut(JsValue)>>
) -> Subscription {
  Subscription::new(move || {
    if let Err(err) =
      unsubscribe.call0(&JsValue::NULL)
    {
      tracing::warn!(
        error = %js_error_text(&err),
        "js unsubscribe failed"
      );
    }
    drop(closures);
  })
}

pub struct FirebaseIdentity;

impl IdentityProvider for FirebaseIdentity {
  fn observe_auth_state(
    &self,
    mut on_change: AuthCallback
  ) -> Subscription {
    let closure = Closure::<
      dyn FnMut(JsValue)
    >::new(
      move |value: JsValue| {
        match serde_wasm_bindgen::from_value::<
          Option<Principal>
        >(value)
        {
          | Ok(principal) => on_change(principal),
          | Err(err) => {
            tracing::error!(
              error = %err,
              "undecodable auth state"
            );
          }
        }
      }
    );
    match observe_auth_state(&closure) {
      | Ok(unsubscribe) => {
        js_subscription(
          unsubscribe,
          vec![closure]
        )
      }
      | Err(err) => {
        tracing::error!(
          error = %js_error_text(&err),
          "could not observe auth state"
        );
        Subscription::noop()
      }
    }
  }

  fn begin_redirect_sign_in(
    &self
  ) -> DeckFuture<()> {
    async {
      begin_redirect_sign_in()
        .await
        .map(|_| ())
        .map_err(|e| {
          DeckError::Auth(js_error_text(&e))
        })
    }
    .boxed_local()
  }

  fn pending_redirect_result(
    &self
  ) -> DeckFuture<Option<Principal>> {
    async {
      let value =
        pending_redirect_result()
          .await
          .map_err(|e| {
            DeckError::Auth(js_error_text(
              &e
            ))
          })?;
      serde_wasm_bindgen::from_value(value)
        .map_err(|e| {
          DeckError::Bridge(format!(
            "decode error: {e}"
          ))
        })
    }
    .boxed_local()
  }
}

pub struct FirestoreStore;

impl DocumentStore for FirestoreStore {
  fn subscribe(
    &self,
    collection: &str,
    mut on_snapshot: SnapshotCallback,
    on_error: ErrorCallback
  ) -> Subscription {
    let on_error =
      Rc::new(RefCell::new(on_error));
    let decode_error = on_error.clone();
    let setup_error = on_error.clone();
    let on_data = Closure::<
      dyn FnMut(JsValue)
    >::new(
      move |value: JsValue| {
        match serde_wasm_bindgen::from_value::<
          Vec<TaskDocument>
        >(value)
        {
          | Ok(docs) => on_snapshot(docs),
          | Err(err) => {
            (*decode_error.borrow_mut())(
              DeckError::Subscription(
                format!("decode error: {err}")
              )
            )
          }
        }
      }
    );
    let on_failure = Closure::<
      dyn FnMut(JsValue)
    >::new(
      move |value: JsValue| {
        (*on_error.borrow_mut())(
          DeckError::Subscription(
            js_error_text(&value)
          )
        )
      }
    );

    match subscribe_collection(
      collection,
      &on_data,
      &on_failure
    ) {
      | Ok(unsubscribe) => {
        js_subscription(
          unsubscribe,
          vec![on_data, on_failure]
        )
      }
      | Err(err) => {
        let reason = js_error_text(&err);
        tracing::error!(
          collection,
          error = %reason,
          "could not subscribe"
        );
        (*setup_error.borrow_mut())(
          DeckError::Subscription(reason)
        );
        Subscription::noop()
      }
    }
  }

  fn delete_document(
    &self,
    collection: &str,
    id: &str
  ) -> DeckFuture<()> {
    let collection = collection.to_string();
    let id = id.to_string();
    async move {
      let result =
        delete_document(&collection, &id)
          .await;
      match result {
        | Ok(_) => Ok(()),
        | Err(e) => {
          Err(DeckError::Delete {
            reason: js_error_text(&e),
            id
          })
        }
      }
    }
    .boxed_local()
  }
}
