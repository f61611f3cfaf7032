//! Argument and filter collection
//!
//! Arguments abandon the whole collection on the first value that does not
//! parse; filters ask for the same field again. Callers rely on both.

use std::io::Write;

use alloy_dyn_abi::DynSolValue;

use super::prompt::{LineInput, Prompter};
use crate::core::{ConsoleError, ConsoleResult};
use crate::domain::abi::{ArgumentSpec, EventSpec};
use crate::domain::contract::FilterSpec;
use crate::infrastructure::abi::encode;

/// Ask for every argument in declared order
pub fn collect_arguments<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    args: &[ArgumentSpec],
) -> ConsoleResult<Vec<DynSolValue>> {
    let mut values = Vec::with_capacity(args.len());
    for (idx, arg) in args.iter().enumerate() {
        let prompt = format!("{} ({}): ", arg.display_name(idx), arg.ty);
        let text = loop {
            let text = prompter.text(&prompt)?;
            if text.trim().is_empty() {
                prompter.say("....");
                continue;
            }
            break text;
        };
        values.push(encode(&text, &arg.ty)?);
    }
    Ok(values)
}

/// Ask which indexed fields of `event` to filter on, and by what value
pub fn collect_filters<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    event: &EventSpec,
) -> ConsoleResult<FilterSpec> {
    let mut filter = FilterSpec::default();
    for (idx, arg) in event.inputs.iter().enumerate() {
        if !arg.indexed {
            continue;
        }
        let question = format!(
            "field {} ({}) is indexed. filter?",
            arg.spec.display_name(idx),
            arg.spec.ty
        );
        if !prompter.yes_no(&question, false)? {
            filter.indexed.push(None);
            continue;
        }

        let value = loop {
            let text = prompter.text("field value (none): ")?;
            if text.trim().is_empty() {
                break None;
            }
            match encode(&text, &arg.spec.ty) {
                Ok(value) => break Some(value),
                Err(ConsoleError::InvalidArgument(reason)) => {
                    prompter.say(format!("can't parse value: {reason}"))
                }
                Err(err) => return Err(err),
            }
        };
        filter.indexed.push(value);
    }
    Ok(filter)
}
