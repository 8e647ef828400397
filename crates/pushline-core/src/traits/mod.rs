// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the seams of the delivery core.
//!
//! Platform facilities (OS task scheduler, foreground execution, push
//! vendors, JWT source) and the replaceable layers (store, gateway, event
//! sink) are all injected through these traits. Async traits use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod foreground;
pub mod gateway;
pub mod identity;
pub mod scheduler;
pub mod sink;
pub mod store;

pub use foreground::ForegroundHost;
pub use gateway::PushGateway;
pub use identity::{JwtProvider, TokenProvider};
pub use scheduler::{TaskHandler, TaskScheduler};
pub use sink::EventSink;
pub use store::PushStore;
