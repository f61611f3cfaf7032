//! Log streams handed out by the contract binding

use std::collections::VecDeque;

use alloy::rpc::types::Log;
use anyhow::Result;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::contract::{LogEntry, LogStream};

/// Buffered entries forwarded ahead of the consumer
const FORWARD_BUFFER: usize = 256;

pub(crate) fn entry_from_rpc(log: Log) -> LogEntry {
    LogEntry {
        block_number: log.block_number.unwrap_or_default(),
        data: log.inner.data,
    }
}

/// Result of a bounded query, fully fetched up front
pub struct BufferedLogs {
    entries: VecDeque<LogEntry>,
}

impl BufferedLogs {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }
}

#[async_trait::async_trait]
impl LogStream for BufferedLogs {
    fn try_next(&mut self) -> Option<Result<LogEntry>> {
        self.entries.pop_front().map(Ok)
    }

    async fn next(&mut self) -> Option<Result<LogEntry>> {
        self.try_next()
    }

    async fn release(self: Box<Self>) {}
}

/// Node-side state that keeps a live stream registered
#[async_trait::async_trait]
pub trait Registration: Send {
    /// Tell the node to stop delivering
    async fn cancel(self: Box<Self>) -> Result<()>;
}

/// Live entries pumped from a transport stream by a background task
pub struct ForwardedLogs {
    rx: mpsc::Receiver<Result<LogEntry>>,
    task: JoinHandle<()>,
    registration: Option<Box<dyn Registration>>,
}

impl ForwardedLogs {
    /// Spawn the forwarder; it stops after the first error, when the
    /// source ends or when the receiver is dropped
    pub fn spawn<S>(source: S, registration: Option<Box<dyn Registration>>) -> Self
    where
        S: Stream<Item = Result<LogEntry>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(FORWARD_BUFFER);
        let task = tokio::spawn(async move {
            let mut source = Box::pin(source);
            while let Some(item) = source.next().await {
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
            tracing::debug!("log source ended");
        });
        Self {
            rx,
            task,
            registration,
        }
    }
}

#[async_trait::async_trait]
impl LogStream for ForwardedLogs {
    fn try_next(&mut self) -> Option<Result<LogEntry>> {
        self.rx.try_recv().ok()
    }

    async fn next(&mut self) -> Option<Result<LogEntry>> {
        self.rx.recv().await
    }

    async fn release(self: Box<Self>) {
        self.task.abort();
        if let Some(registration) = self.registration {
            if let Err(err) = registration.cancel().await {
                tracing::warn!("failed to cancel log registration: {err:#}");
            }
        }
        tracing::debug!("log subscription released");
    }
}
