//! Constant calls and transactions

use std::io::Write;

use alloy::primitives::B256;

use crate::core::{ConsoleError, ConsoleResult, SessionContext, Signer};
use crate::domain::abi::MethodSpec;
use crate::domain::contract::{ContractBinding, GasOracle, GasSetting, TransactionOptions};
use crate::infrastructure::abi::CallResult;
use crate::ui::{collect_arguments, LineInput, Prompter};

/// Call a constant method and print one line per output
pub async fn call_constant<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    binding: &dyn ContractBinding,
    method: &MethodSpec,
) -> ConsoleResult<CallResult> {
    if !method.constant {
        return Err(ConsoleError::not_constant(&method.key));
    }
    let args = collect_arguments(prompter, &method.inputs)?;
    let values = binding
        .call(method, &args)
        .await
        .map_err(ConsoleError::external)?;

    let result = CallResult::collect(&method.outputs, values)?;
    for line in result.render(&method.outputs) {
        prompter.say(line);
    }
    Ok(result)
}

/// Sign and submit one transaction calling `method`
///
/// The signer is checked before anything is asked. Any cancelled prompt
/// abandons the attempt before the binding is reached.
pub async fn transact<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    binding: &dyn ContractBinding,
    gas: &dyn GasOracle,
    ctx: &SessionContext,
    method: &MethodSpec,
) -> ConsoleResult<B256> {
    if method.constant {
        return Err(ConsoleError::constant(&method.key));
    }
    let Signer::Key(key) = &ctx.signer else {
        return Err(ConsoleError::SignerNotConfigured);
    };

    let args = collect_arguments(prompter, &method.inputs)?;
    let options = negotiate_options(prompter, gas, method).await?;

    let hash = binding
        .transact(method, &args, &options, key)
        .await
        .map_err(ConsoleError::external)?;
    prompter.say(format!("transaction sent: {hash}"));
    Ok(hash)
}

/// Value, gas price and gas limit for one attempt
pub async fn negotiate_options<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    gas: &dyn GasOracle,
    method: &MethodSpec,
) -> ConsoleResult<TransactionOptions> {
    let mut options = TransactionOptions::default();

    if method.payable && prompter.yes_no("method is payable. send amount with transaction?", false)? {
        options.value = Some(prompter.big_int("amount: ")?);
    }

    if !prompter.yes_no("estimate gas price?", true)? {
        let suggested = gas
            .suggest_gas_price()
            .await
            .map_err(ConsoleError::external)?;
        let price = prompter.big_int_with_default(&format!("gas price ({suggested}): "), suggested)?;
        options.gas_price = GasSetting::Explicit(price);
    }

    if !prompter.yes_no("estimate gas limit?", true)? {
        let limit = prompter.int_with_default("gas limit (0): ", 0)?;
        // zero (or less) leaves the limit to the binding
        options.gas_limit = GasSetting::Explicit(u64::try_from(limit).unwrap_or(0));
    }

    Ok(options)
}
