// Copyright 2026 Navscope Contributors
// SPDX-License-Identifier: Apache-2.0

//! Navscope library — batch retrieval of investment-trust performance data.
//!
//! This library crate exposes the core modules for integration testing.

pub mod capture;
pub mod cli;
pub mod discover;
pub mod http_client;
pub mod input;
pub mod morningstar;
pub mod pipeline;
pub mod renderer;
pub mod report;
