//! Error types.
//!
//! Runtime conditions (full queues, full subscriber channels, unknown tags)
//! are never surfaced to producers; they are logged and counted. The types
//! here cover the two places where a caller does get a `Result`:
//! - [`PayloadError`] – a command payload did not have the shape its tag
//!   requires; handlers return it and the dispatcher logs it.
//! - [`BuildError`] – an entity was wired incorrectly at construction time.

use crate::components::payload::PayloadKind;
use thiserror::Error;

/// A command payload could not be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("expected {expected:?} payload, found {found:?}")]
    Mismatch {
        expected: PayloadKind,
        found: PayloadKind,
    },
    #[error("invalid payload value: {0}")]
    Invalid(String),
}

/// Construction-time wiring error for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("entity '{0}' has no layout strategy")]
    MissingLayout(String),
    #[error("entity '{0}' needs a command queue capacity greater than zero")]
    ZeroCapacity(String),
    #[error("entity '{0}' needs a per-frame drain cap greater than zero")]
    ZeroFrameCap(String),
}
