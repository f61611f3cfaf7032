//! ABI domain models
//!
//! Types describing a contract interface, independent of how the
//! interface was loaded or how values travel to the chain.

mod interface;
mod types;

pub use interface::{ContractInterface, EventArgument, EventSpec, MethodSpec};
pub use types::{ArgumentSpec, TupleField, TypeDescriptor};
