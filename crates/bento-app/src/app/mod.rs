//! Controller and shared state

pub mod controller;
pub mod state;
