//! `signer/key` and `signer/show`

use std::io::Write;

use alloy::primitives::Address;

use crate::core::{ConsoleError, ConsoleResult, SessionContext, Signer};
use crate::infrastructure::signer::{load_keystore, load_plain_key};
use crate::ui::{LineInput, Prompter};

/// Load a key file and make it the session signer
///
/// On any failure the previous signer stays in place.
pub fn configure_key<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    ctx: &mut SessionContext,
) -> ConsoleResult<Address> {
    let path = prompter.path("key file: ", &ctx.key_dir, true)?;
    let key = if prompter.yes_no("encrypted?", false)? {
        let password = prompter.password("password: ")?;
        load_keystore(&path, &password)
    } else {
        load_plain_key(&path)
    }
    .map_err(ConsoleError::external)?;

    let address = key.address();
    ctx.set_signer(Signer::Key(key));
    tracing::info!(%address, "signer configured");
    prompter.say(format!("signer: {address}"));
    Ok(address)
}

/// Print the configured signer
pub fn show_signer<L: LineInput, W: Write>(prompter: &mut Prompter<L, W>, ctx: &SessionContext) {
    match ctx.signer.address() {
        Some(address) => prompter.say(format!("signer: {address}")),
        None => prompter.say("signer: not configured"),
    }
}
