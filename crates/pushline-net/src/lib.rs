// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network request layer for the Pushline delivery core.
//!
//! [`ApiClient`] implements `PushGateway` over reqwest. Every call performs
//! exactly one HTTP attempt and a [`ResponseClassifier`] turns the response
//! into a `RequestOutcome`. Nothing in this crate retries.

pub mod body;
pub mod classifier;
pub mod client;
pub mod endpoints;

pub use classifier::{DefaultClassifier, HttpReply, ResponseClassifier};
pub use client::ApiClient;
