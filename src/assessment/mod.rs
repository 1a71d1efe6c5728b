// src/assessment/mod.rs

//! Assessment engine: question selection, countdown, answer tracking, scoring and the
//! attempt lifecycle. Storage is reached only through the `store` traits.

pub mod answers;
pub mod provider;
pub mod scorer;
pub mod session;
pub mod timer;

pub use session::{AttemptSession, SessionRegistry, SessionStatus, SubmitOutcome, SubmitTrigger};
