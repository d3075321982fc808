pub mod carousel;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod memory;
pub mod model;
pub mod ports;
pub mod route;
pub mod schedule;
pub mod session;

pub use controller::{
  DeleteOutcome,
  TaskViewController
};
pub use error::DeckError;
pub use session::{
  RedirectOutcome,
  SessionResolver,
  SignInOutcome
};
pub use taskdeck_shared::{
  Principal,
  TaskDocument,
  TaskDto,
  TaskFilter,
  TaskStatus
};
