// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tether tests.
//!
//! # Components
//!
//! - [`MockService`] - service with a hand-built declaration and optional feature
//! - [`RecordingDispatcher`] - dispatcher that captures every reload
//! - [`FlakySource`] - bus-backed source that can refuse releases

pub mod mock_dispatcher;
pub mod mock_service;
pub mod mock_source;

pub use mock_dispatcher::RecordingDispatcher;
pub use mock_service::MockService;
pub use mock_source::FlakySource;
