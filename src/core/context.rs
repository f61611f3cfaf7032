//! Session context threaded through console commands

use std::path::PathBuf;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

/// Transaction signer configured for the session
#[derive(Debug, Clone, Default)]
pub enum Signer {
    /// No signer configured yet
    #[default]
    Unset,
    /// Local private key
    Key(PrivateKeySigner),
}

impl Signer {
    /// Address the signer signs for, if any
    pub fn address(&self) -> Option<Address> {
        match self {
            Signer::Unset => None,
            Signer::Key(key) => Some(key.address()),
        }
    }
}

/// Mutable state shared by commands within one console session
#[derive(Debug)]
pub struct SessionContext {
    /// Current signer; last assignment wins
    pub signer: Signer,

    /// Directory key-file selection starts from
    pub key_dir: PathBuf,
}

impl SessionContext {
    pub fn new(key_dir: PathBuf) -> Self {
        Self {
            signer: Signer::Unset,
            key_dir,
        }
    }

    /// Replace the session signer
    pub fn set_signer(&mut self, signer: Signer) {
        self.signer = signer;
    }
}
