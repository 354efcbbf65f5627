//! Core Types
//!
//! Shared data types for operation inputs/outputs, configuration and model metadata.
//!
//! - **`operation`** - `OperationType` and name canonicalization helpers
//! - **`input`** - typed per-operation inputs plus the `OperationInput` envelope
//! - **`output`** - typed per-operation outputs plus the `OperationOutput` envelope
//! - **`config`** - configuration maps, API definitions and authentication
//! - **`models`** - configured model lists and admin model overrides

pub mod config;
pub mod input;
pub mod models;
pub mod operation;
pub mod output;

pub use config::*;
pub use input::*;
pub use models::*;
pub use operation::*;
pub use output::*;
