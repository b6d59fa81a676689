//! `msgcheck-engine`: checks a recorded message run against timed expectations.
//!
//! Pure engine crate: receives pre-loaded expectations and messages, returns
//! classified pairings. No CLI dependencies.

pub mod classify;
pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod load;
pub mod matcher;
pub mod model;
pub mod summary;

pub use config::{CheckConfig, CheckOptions, RankingMode};
pub use engine::{assign, run};
pub use error::CheckError;
pub use model::{CheckMode, CheckResult, Expectation, ObservedMessage, Outcome, Pairing, Verdict};
