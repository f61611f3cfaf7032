//! Ethereum infrastructure - Alloy-backed contract binding

mod logs;
mod provider;

pub use logs::{BufferedLogs, ForwardedLogs, Registration};
pub use provider::{connect, AlloyContract, ProviderConfig};
