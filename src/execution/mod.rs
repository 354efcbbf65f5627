//! Call execution pipeline
//!
//! Everything that happens to one trigger call, in order:
//! - `normalizer`: raw arguments -> `(input, model id, tags)`
//! - `config`: layered effective configuration
//! - `context`: the per-call `CallContext` and its lifecycle state
//! - `dispatcher`: pre observers, invocation, post observers, stream correlation
//! - `dispatch_table`: operation type -> typed capability invoker
//! - `errors`: raw provider errors -> closed failure taxonomy

pub mod config;
pub mod context;
pub mod dispatch_table;
pub mod dispatcher;
pub mod errors;
pub mod normalizer;

pub use config::ConfigResolver;
pub use context::{CallContext, CallState};
pub use dispatch_table::{DispatchTable, InvokeFuture, Invoker};
pub use dispatcher::LifecycleDispatcher;
pub use errors::{ErrorNormalizer, ErrorScope};
pub use normalizer::{CallArg, CallNormalizer, NormalizedCall};
