// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Connection seam used by the appender

use super::error::LogShipResult;

/// One log record as stored in the destination table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub id: i64,
    pub timestamp: i64,
    pub level: String,
    pub message: String,
}

/// A connection to the database receiving log rows
pub trait LogClient: Send {
    /// Names of every user table
    fn list_tables(&mut self) -> LogShipResult<Vec<String>>;

    /// Run one ad hoc statement
    fn adhoc(&mut self, sql: &str) -> LogShipResult<()>;

    /// `SELECT MAX(id)` of `table`; `None` when it is empty
    fn query_max_id(&mut self, table: &str) -> LogShipResult<Option<i64>>;

    fn call_procedure(&mut self, procedure: &str, row: &LogRow) -> LogShipResult<()>;

    fn bulk_insert(&mut self, table: &str, rows: &[LogRow]) -> LogShipResult<()>;

    /// Block until every outstanding request has completed
    fn drain(&mut self) -> LogShipResult<()>;

    fn close(&mut self) -> LogShipResult<()>;
}
