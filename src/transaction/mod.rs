//! Transactions
//!
//! Build a batch of operations, emit it as `transact` params, and resolve
//! the named uuids of its inserts from the server's reply.

mod builder;
mod errors;
mod operation;
mod resolve;
mod result;

pub use builder::TransactionBuilder;
pub use errors::{ResolutionError, ResolutionResult};
pub use operation::{Delete, Insert, Mutate, Operation, Select, Update};
pub use resolve::{resolve, UuidMapping};
pub use result::{parse_results, OperationResult};
