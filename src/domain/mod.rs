//! Domain layer - contract interface models and the capabilities the
//! console needs from the chain

pub mod abi;
pub mod contract;
