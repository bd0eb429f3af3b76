// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tether endpoint publisher.

use thiserror::Error;

use crate::types::Handle;

/// Boxed error used for failures coming from outside the core
/// (event sources, dispatchers, subscriber callbacks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across the Tether crates.
#[derive(Debug, Error)]
pub enum TetherError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A holder was asked to act on a component that has not been provisioned.
    #[error("no component is provisioned")]
    NotProvisioned,

    /// A holder already carries a component.
    #[error("a component is already provisioned")]
    AlreadyProvisioned,

    /// A lifecycle transition was requested from the wrong state.
    #[error("invalid state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// Releasing the external resource behind a handle failed.
    #[error("failed to release service {handle}: {source}")]
    Release { handle: Handle, source: BoxError },

    /// A change subscriber returned an error or panicked.
    #[error("subscriber {id} failed: {message}")]
    Subscriber { id: String, message: String },

    /// The downstream dispatcher could not reload its singleton set.
    #[error("dispatcher error: {message}")]
    Dispatcher {
        message: String,
        source: Option<BoxError>,
    },

    /// The event source does not know the handle.
    #[error("service not found: {0}")]
    ServiceNotFound(Handle),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
