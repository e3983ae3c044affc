//! Test utilities for SchemaPack integration tests
//!
//! ProjectFixture lays out a project directory (descriptor, schema files,
//! compiled classes, jars) inside a temporary directory.

pub mod project_fixture;
