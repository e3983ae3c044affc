// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Log appender writing records into a database table

use super::client::{LogClient, LogRow};
use super::config::{AppenderConfig, InsertMethod};
use super::error::{LogShipError, LogShipResult};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::Mutex;

/// Procedure created alongside the destination table
pub const INSERT_PROCEDURE: &str = "LogInsert";

/// Statements creating the destination table and its insert procedure
pub fn provisioning_sql(table: &str) -> [String; 3] {
    [
        format!(
            "CREATE TABLE {} ( id INT UNIQUE NOT NULL, timestamp BIGINT, \
             level VARCHAR(10), message VARCHAR(255))",
            table
        ),
        format!("PARTITION TABLE {} ON COLUMN id;", table),
        format!(
            "CREATE PROCEDURE {} AS INSERT INTO {} (id, timestamp, level, message) VALUES (?,?,?,?);",
            INSERT_PROCEDURE, table
        ),
    ]
}

enum InsertDevice {
    Bulk { pending: Vec<LogRow>, batch_size: usize },
    Procedure,
}

/// Inserts log rows through a [`LogClient`]
pub struct LogAppender<C: LogClient> {
    client: C,
    table: String,
    device: InsertDevice,
    next_id: i64,
    closed: bool,
}

impl<C: LogClient> LogAppender<C> {
    /// Provision the destination table if needed and pick the insert method
    ///
    /// An existing table is reused and ids continue after its largest id.
    pub fn connect(mut client: C, config: &AppenderConfig) -> LogShipResult<Self> {
        let existing = client
            .list_tables()?
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&config.table));

        let next_id = if existing {
            log::info!("Using existing table '{}'", config.table);
            client.query_max_id(&config.table)?.map_or(0, |max| max + 1)
        } else {
            for sql in provisioning_sql(&config.table) {
                client.adhoc(&sql)?;
            }
            0
        };

        let device = match config.insert {
            InsertMethod::BulkLoader => InsertDevice::Bulk {
                pending: Vec::new(),
                batch_size: config.batch_size.max(1),
            },
            InsertMethod::Procedure => InsertDevice::Procedure,
        };

        Ok(Self {
            client,
            table: config.table.clone(),
            device,
            next_id,
            closed: false,
        })
    }

    /// Id the next appended record will get
    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn insert(
        &mut self,
        sequence_id: i64,
        timestamp: i64,
        level: &str,
        message: &str,
    ) -> LogShipResult<()> {
        if self.closed {
            return Err(LogShipError::Closed);
        }
        let row = LogRow {
            id: sequence_id,
            timestamp,
            level: level.to_string(),
            message: message.to_string(),
        };
        match &mut self.device {
            InsertDevice::Bulk {
                pending,
                batch_size,
            } => {
                pending.push(row);
                if pending.len() >= *batch_size {
                    let rows = std::mem::take(pending);
                    self.client.bulk_insert(&self.table, &rows)?;
                }
            }
            InsertDevice::Procedure => self.client.call_procedure(INSERT_PROCEDURE, &row)?,
        }
        Ok(())
    }

    /// Insert with the next sequence id
    pub fn append(&mut self, timestamp: i64, level: &str, message: &str) -> LogShipResult<()> {
        let id = self.next_id;
        self.insert(id, timestamp, level, message)?;
        self.next_id += 1;
        Ok(())
    }

    /// Flush buffered rows and wait for outstanding requests
    pub fn drain(&mut self) -> LogShipResult<()> {
        if let InsertDevice::Bulk { pending, .. } = &mut self.device {
            if !pending.is_empty() {
                let rows = std::mem::take(pending);
                self.client.bulk_insert(&self.table, &rows)?;
            }
        }
        self.client.drain()
    }

    pub fn close(&mut self) -> LogShipResult<()> {
        if self.closed {
            return Ok(());
        }
        self.drain()?;
        self.closed = true;
        self.client.close()
    }
}

/// [`log::Log`] front end for a [`LogAppender`]
///
/// Failures are written to stderr; logging never fails the caller.
pub struct DbLogger<C: LogClient> {
    appender: Mutex<LogAppender<C>>,
    level: LevelFilter,
}

impl<C: LogClient + 'static> DbLogger<C> {
    pub fn new(appender: LogAppender<C>, level: LevelFilter) -> Self {
        Self {
            appender: Mutex::new(appender),
            level,
        }
    }

    /// Install as the global logger
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    pub fn close(&self) {
        if let Err(err) = self.appender.lock().close() {
            eprintln!("Unable to close log connection: {}", err);
        }
    }
}

impl<C: LogClient> Log for DbLogger<C> {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let timestamp = chrono::Utc::now().timestamp_millis();
        let message = record.args().to_string();
        let mut appender = self.appender.lock();
        if let Err(err) = appender.append(timestamp, record.level().as_str(), &message) {
            eprintln!("Failed to insert log record: {}", err);
        }
    }

    fn flush(&self) {
        if let Err(err) = self.appender.lock().drain() {
            eprintln!("Failed to flush log records: {}", err);
        }
    }
}
