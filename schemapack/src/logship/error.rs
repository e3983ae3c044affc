// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Errors raised while shipping log records

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogShipError {
    #[error("Unable to connect to {server}:{port}: {message}")]
    Connection {
        server: String,
        port: u16,
        message: String,
    },

    #[error("Call to {procedure} failed: {message}")]
    Request { procedure: String, message: String },

    #[error("Unrecognized insert method: '{0}'")]
    UnknownInsertMethod(String),

    #[error("Log appender is closed")]
    Closed,
}

pub type LogShipResult<T> = Result<T, LogShipError>;
