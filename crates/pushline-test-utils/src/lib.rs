// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Pushline integration tests.
//!
//! Provides mock collaborators for fast, deterministic tests without a
//! server, push vendors or an OS task scheduler.
//!
//! # Components
//!
//! - [`MockGateway`] - scripted network outcomes with call capture
//! - [`RecordingSink`] - event sink that keeps every event
//! - [`MockTokenProvider`], [`MockJwtProvider`] - identity sources
//! - [`MockForegroundHost`] - foreground host with start/stop capture
//! - [`ManualScheduler`] - task scheduler driven explicitly by the test

pub mod mock_foreground;
pub mod mock_gateway;
pub mod mock_identity;
pub mod mock_scheduler;
pub mod recording_sink;

pub use mock_foreground::MockForegroundHost;
pub use mock_gateway::{GatewayCall, MockGateway, Reply};
pub use mock_identity::{MockJwtProvider, MockTokenProvider};
pub use mock_scheduler::ManualScheduler;
pub use recording_sink::RecordingSink;
