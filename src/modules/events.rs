//! Historical and live event queries

use std::io::Write;

use crate::core::{ConsoleError, ConsoleResult};
use crate::domain::abi::EventSpec;
use crate::domain::contract::{BlockRange, ContractBinding, Interrupt, LogEntry, LogStream};
use crate::infrastructure::abi::codec::{decode_log, format_event};
use crate::ui::{collect_filters, LineInput, Prompter};

/// Print past entries of `event`; returns how many were printed
pub async fn list_events<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    binding: &dyn ContractBinding,
    event: &EventSpec,
) -> ConsoleResult<usize> {
    let filter = collect_filters(prompter, event)?;
    let start = prompter.int_with_default("start block (0): ", 0)?;
    let end = prompter.int_with_default("end block (last, -1): ", -1)?;
    let range = BlockRange {
        from: u64::try_from(start).unwrap_or(0),
        to: u64::try_from(end).ok(),
    };

    let mut stream = binding
        .query_logs(event, &filter, range)
        .await
        .map_err(ConsoleError::external)?;
    let drained = drain_available(prompter, event, stream.as_mut());
    stream.release().await;
    drained
}

/// Print entries that are already available without waiting for more
fn drain_available<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    event: &EventSpec,
    stream: &mut dyn LogStream,
) -> ConsoleResult<usize> {
    let mut printed = 0;
    while let Some(item) = stream.try_next() {
        let entry = item.map_err(delivery_error)?;
        print_entry(prompter, event, &entry)?;
        printed += 1;
    }
    Ok(printed)
}

/// Print new entries of `event` until interrupted
///
/// An interrupt ends the watch quietly; a delivery error or a closed
/// subscription is reported. The subscription is released either way.
pub async fn watch_events<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    binding: &dyn ContractBinding,
    interrupt: &dyn Interrupt,
    event: &EventSpec,
) -> ConsoleResult<usize> {
    let filter = collect_filters(prompter, event)?;
    let mut stream = binding
        .watch_logs(event, &filter)
        .await
        .map_err(ConsoleError::external)?;

    let interrupted = interrupt.notified();
    tokio::pin!(interrupted);

    let mut printed = 0;
    let outcome = loop {
        tokio::select! {
            _ = &mut interrupted => break Ok(printed),
            item = stream.next() => match item {
                Some(Ok(entry)) => {
                    if let Err(err) = print_entry(prompter, event, &entry) {
                        break Err(err);
                    }
                    printed += 1;
                }
                Some(Err(err)) => break Err(delivery_error(err)),
                None => break Err(ConsoleError::DeliveryError("subscription closed".into())),
            },
        }
    };

    stream.release().await;
    outcome
}

fn print_entry<L: LineInput, W: Write>(
    prompter: &mut Prompter<L, W>,
    event: &EventSpec,
    entry: &LogEntry,
) -> ConsoleResult<()> {
    let pairs = decode_log(event, entry).map_err(delivery_error)?;
    prompter.say(format!("  {}", format_event(entry.block_number, &pairs)));
    Ok(())
}

fn delivery_error(err: anyhow::Error) -> ConsoleError {
    ConsoleError::DeliveryError(format!("{err:#}"))
}
