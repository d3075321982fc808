use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeckError {
  #[error("authentication failed: {0}")]
  Auth(String),
  #[error(
    "task subscription failed: {0}"
  )]
  Subscription(String),
  #[error(
    "failed to delete task {id}: \
     {reason}"
  )]
  Delete {
    id:     String,
    reason: String
  },
  #[error("bridge error: {0}")]
  Bridge(String)
}
