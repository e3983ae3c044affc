// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Log shipping into a running database
//!
//! [`LogAppender`] writes log records into a table through a [`LogClient`],
//! creating the table and its insert procedure on first use. [`DbLogger`]
//! exposes it as a [`log::Log`] implementation.

pub mod appender;
pub mod client;
pub mod config;
pub mod error;

pub use appender::{provisioning_sql, DbLogger, LogAppender, INSERT_PROCEDURE};
pub use client::{LogClient, LogRow};
pub use config::{AppenderConfig, InsertMethod};
pub use error::{LogShipError, LogShipResult};
