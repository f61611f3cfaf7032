//! Interface description loader - reads a JSON ABI from disk

use std::fs;
use std::path::Path;

use alloy_json_abi::JsonAbi;
use anyhow::{bail, Context, Result};

use crate::domain::abi::ContractInterface;

/// Files larger than this are not ABI files
const MAX_ABI_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Load a contract interface from an ABI file
///
/// Accepts either a raw ABI array or a compiler artifact with an `abi`
/// field (Foundry `out/`, Hardhat `artifacts/`).
pub fn load_interface(path: impl AsRef<Path>) -> Result<ContractInterface> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    if metadata.len() > MAX_ABI_FILE_BYTES {
        bail!("{} is too large to be an ABI file", path.display());
    }

    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let interface = parse_interface(&content).with_context(|| format!("parse {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        methods = interface.methods().count(),
        events = interface.events().count(),
        "loaded interface"
    );
    Ok(interface)
}

/// Parse ABI JSON text into a contract interface
pub fn parse_interface(content: &str) -> Result<ContractInterface> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let abi_value = if value.is_array() {
        value
    } else if let Some(abi) = value.get("abi") {
        abi.clone()
    } else {
        bail!("no ABI found (expected an array or an object with an \"abi\" field)");
    };

    let abi: JsonAbi = serde_json::from_value(abi_value)?;
    ContractInterface::from_json_abi(&abi)
}
