//! Console commands
//!
//! - contract: constant calls and transactions with gas negotiation
//! - events: historical listing and live watching
//! - signer: session signer configuration

pub mod contract;
pub mod events;
pub mod signer;
