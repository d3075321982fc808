use std::time::Duration;

use anyhow::{
  Context,
  anyhow,
  bail
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info
};
use url::form_urlencoded;

use crate::carousel::{
  DEFAULT_INTERVAL,
  DEFAULT_WINDOW
};

pub const DEFAULT_COLLECTION: &str =
  "tasks";
pub const DEFAULT_FALLBACK_NAME: &str =
  "User";

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Firebase,
  Memory
}

impl Backend {
  fn parse(value: &str) -> Option<Self> {
    match value
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "firebase" => Some(Self::Firebase),
      | "memory" => Some(Self::Memory),
      | _ => None
    }
  }
}

/// Web SDK settings handed verbatim to
/// `initializeApp`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(default)]
pub struct FirebaseConfig {
  pub api_key:             String,
  pub auth_domain:         String,
  pub project_id:          String,
  pub storage_bucket:      String,
  pub messaging_sender_id: String,
  pub app_id:              String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(default)]
pub struct StoreConfig {
  pub backend:    Backend,
  pub collection: String
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend:    Backend::Firebase,
      collection: DEFAULT_COLLECTION
        .to_string()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(default)]
pub struct CarouselConfig {
  pub interval_ms: u64,
  pub window:      usize
}

impl Default for CarouselConfig {
  fn default() -> Self {
    Self {
      interval_ms: DEFAULT_INTERVAL
        .as_millis()
        as u64,
      window:      DEFAULT_WINDOW
    }
  }
}

impl CarouselConfig {
  pub fn interval(&self) -> Duration {
    Duration::from_millis(
      self.interval_ms
    )
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(default)]
pub struct SessionConfig {
  pub fallback_display_name: String
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      fallback_display_name:
        DEFAULT_FALLBACK_NAME.to_string()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(default)]
pub struct DeckConfig {
  pub firebase: FirebaseConfig,
  pub store:    StoreConfig,
  pub carousel: CarouselConfig,
  pub session:  SessionConfig
}

impl DeckConfig {
  #[tracing::instrument(skip(text))]
  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let cfg: DeckConfig =
      toml::from_str(text).context(
        "failed to parse taskdeck \
         config"
      )?;
    cfg.validate()?;
    info!(
      backend = ?cfg.store.backend,
      collection = %cfg.store.collection,
      interval_ms = cfg.carousel.interval_ms,
      "loaded taskdeck config"
    );
    Ok(cfg)
  }

  /// Applies dotted `key=value`
  /// overrides. A leading `rc.` is
  /// accepted and ignored.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.set(&key, &v).with_context(
        || {
          format!(
            "invalid override {key}={v}"
          )
        }
      )?;
    }
    self.validate()
  }

  pub fn validate(
    &self
  ) -> anyhow::Result<()> {
    if self.store.collection.trim().is_empty()
    {
      bail!(
        "store.collection must not be \
         empty"
      );
    }
    if self.carousel.interval_ms == 0 {
      bail!(
        "carousel.interval_ms must be \
         positive"
      );
    }
    if self.carousel.window == 0 {
      bail!(
        "carousel.window must be \
         positive"
      );
    }
    Ok(())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    let value = value.trim();
    match key {
      | "store.backend" => {
        self.store.backend =
          Backend::parse(value)
            .ok_or_else(|| {
              anyhow!(
                "unknown backend \
                 {value:?}"
              )
            })?;
      }
      | "store.collection" => {
        self.store.collection =
          value.to_string();
      }
      | "carousel.interval_ms" => {
        self.carousel.interval_ms =
          value.parse::<u64>().context(
            "interval must be an \
             integer"
          )?;
      }
      | "carousel.window" => {
        self.carousel.window =
          value.parse::<usize>().context(
            "window must be an integer"
          )?;
      }
      | "session.fallback_display_name" => {
        self
          .session
          .fallback_display_name =
          value.to_string();
      }
      | "firebase.api_key" => {
        self.firebase.api_key =
          value.to_string();
      }
      | "firebase.auth_domain" => {
        self.firebase.auth_domain =
          value.to_string();
      }
      | "firebase.project_id" => {
        self.firebase.project_id =
          value.to_string();
      }
      | "firebase.storage_bucket" => {
        self.firebase.storage_bucket =
          value.to_string();
      }
      | "firebase.messaging_sender_id" => {
        self
          .firebase
          .messaging_sender_id =
          value.to_string();
      }
      | "firebase.app_id" => {
        self.firebase.app_id =
          value.to_string();
      }
      | other => {
        bail!("unknown config key {other}")
      }
    }
    Ok(())
  }
}

/// Decodes `a=b` pairs out of a URL query
/// string, keeping only `rc.`-prefixed
/// keys. Percent escapes and `+` are
/// decoded.
pub fn overrides_from_query(
  query: &str
) -> Vec<(String, String)> {
  form_urlencoded::parse(
    query.trim_start_matches('?').as_bytes()
  )
  .filter(|(key, _)| {
    key.starts_with("rc.")
  })
  .map(|(key, value)| {
    (key.into_owned(), value.into_owned())
  })
  .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let cfg = DeckConfig::from_toml_str("")
      .expect("defaults parse");

    assert_eq!(
      cfg.store.backend,
      Backend::Firebase
    );
    assert_eq!(cfg.store.collection, "tasks");
    assert_eq!(
      cfg.carousel.interval(),
      Duration::from_secs(10)
    );
    assert_eq!(cfg.carousel.window, 3);
    assert_eq!(
      cfg.session.fallback_display_name,
      "User"
    );
  }

  #[test]
  fn sections_override_defaults() {
    let cfg = DeckConfig::from_toml_str(
      r#"
[firebase]
project_id = "deck-dev"

[store]
backend = "memory"

[carousel]
interval_ms = 2500
"#
    )
    .expect("parse config");

    assert_eq!(
      cfg.firebase.project_id,
      "deck-dev"
    );
    assert_eq!(
      cfg.store.backend,
      Backend::Memory
    );
    assert_eq!(cfg.carousel.interval_ms, 2500);
    assert_eq!(cfg.carousel.window, 3);
  }

  #[test]
  fn zero_interval_is_rejected() {
    let err = DeckConfig::from_toml_str(
      "[carousel]\ninterval_ms = 0\n"
    )
    .expect_err("zero interval");
    assert!(
      err.to_string().contains("interval")
    );
  }

  #[test]
  fn overrides_accept_rc_prefix() {
    let mut cfg = DeckConfig::default();
    cfg
      .apply_overrides(vec![
        (
          "rc.store.backend".to_string(),
          "Memory".to_string()
        ),
        (
          "carousel.window".to_string(),
          "2".to_string()
        ),
      ])
      .expect("apply overrides");

    assert_eq!(
      cfg.store.backend,
      Backend::Memory
    );
    assert_eq!(cfg.carousel.window, 2);
  }

  #[test]
  fn unknown_override_key_fails() {
    let mut cfg = DeckConfig::default();
    let err = cfg
      .apply_overrides(vec![(
        "store.engine".to_string(),
        "x".to_string()
      )])
      .expect_err("unknown key");
    assert!(format!("{err:#}").contains(
      "unknown config key store.engine"
    ));
  }

  #[test]
  fn query_overrides_keep_rc_keys_only() {
    let pairs = overrides_from_query(
      "?rc.store.backend=memory&utm=x&\
       rc.carousel.window=1"
    );
    assert_eq!(
      pairs,
      vec![
        (
          "rc.store.backend".to_string(),
          "memory".to_string()
        ),
        (
          "rc.carousel.window".to_string(),
          "1".to_string()
        ),
      ]
    );
  }

  #[test]
  fn query_override_values_are_decoded() {
    let mut cfg = DeckConfig::default();
    let pairs = overrides_from_query(
      "?rc.session.fallback_display_name=\
       Jane%20Doe&rc.store.collection=\
       team+tasks"
    );

    cfg
      .apply_overrides(pairs)
      .expect("apply overrides");

    assert_eq!(
      cfg.session.fallback_display_name,
      "Jane Doe"
    );
    assert_eq!(
      cfg.store.collection,
      "team tasks"
    );
  }
}
