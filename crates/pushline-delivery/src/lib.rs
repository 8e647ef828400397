// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery core of Pushline.
//!
//! Serializes submissions per operation kind, drains pending rows in
//! scheduled retry passes, and wraps work that must survive the host app
//! going to the background in a foreground window.

pub mod backoff;
pub mod context;
pub mod foreground;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod worker;

pub use backoff::BackoffPolicy;
pub use context::{DeliveryContext, Settled};
pub use foreground::ForegroundBridge;
pub use queue::{AllKindsGuard, CommandQueue};
pub use retry::{KindState, RetryScheduler};
pub use scheduler::{Connectivity, TokioTaskScheduler};
pub use worker::{
    attempt_mobile_event, attempt_push_event, attempt_subscribe, attempt_token_update, run_pass,
    PassSummary,
};
