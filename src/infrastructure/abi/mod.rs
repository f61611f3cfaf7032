//! ABI infrastructure - interface loading and value coding on top of
//! alloy-json-abi / alloy-dyn-abi

pub mod codec;
pub mod loader;

pub use codec::{decode, encode, CallResult};
pub use loader::load_interface;
