// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for SchemaPack
//!
//! Compiles project descriptors into catalog archives and inspects the
//! archives it produced.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands, CompileArgs};
pub use handlers::{handle_compile, handle_inspect};
