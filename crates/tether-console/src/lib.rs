// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only diagnostics for a running [`Publisher`](tether_publisher::Publisher).
//!
//! [`text`] renders the command-line listings, [`html`] the console page,
//! and [`routes`] serves both plus JSON views over axum.

pub mod html;
pub mod routes;
pub mod text;

pub use routes::{ConsoleSettings, ConsoleState, HealthState, router};
pub use text::{render_endpoints, render_features, render_providers};
