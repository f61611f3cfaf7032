//! Infrastructure layer - external service integrations
//!
//! This layer contains:
//! - ABI loading and the text/value codec built on alloy-dyn-abi
//! - The Alloy-backed contract binding and log streams
//! - Key file loading, directory listing and Ctrl-C handling

pub mod abi;
pub mod ethereum;
pub mod signer;
pub mod system;

pub use ethereum::{connect, AlloyContract, ProviderConfig};
pub use system::{CtrlC, WalkDirListing};
