//! Key file loading for the session signer

use std::fs;
use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};

/// Decrypt a JSON keystore file
pub fn load_keystore(path: &Path, password: &str) -> Result<PrivateKeySigner> {
    PrivateKeySigner::decrypt_keystore(path, password)
        .with_context(|| format!("decrypt keystore {}", path.display()))
}

/// Read a hex private key (with or without `0x`) from a plain text file
pub fn load_plain_key(path: &Path) -> Result<PrivateKeySigner> {
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    content
        .trim()
        .parse::<PrivateKeySigner>()
        .with_context(|| format!("{} does not hold a hex private key", path.display()))
}
