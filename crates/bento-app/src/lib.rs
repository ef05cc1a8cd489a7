//! Bento Application Layer
//!
//! Commands, snapshots and the controller that drives a [`bento::Board`],
//! plus the prompt/confirm seams used by interactive front ends.
//! Depends on the `bento` core crate.

pub mod app;
pub mod error;
pub mod interaction;

pub use app::controller::AppController;
pub use app::state::{AppCommand, AppSnapshot};
pub use error::{AppError, Result};
pub use interaction::{AssumeYes, Confirm, PromptAnswer, PromptRequest, Prompter};
