//! Event streaming from the hub back to the invoking CLI.

use std::sync::Mutex;

use anyhow::Result;
use tokio::sync::mpsc;

use lattice_core::error::RpcResult;
use lattice_core::idl::{hub_reply, HubReply, LogLevel, LogMessage, ProgressMessage};
use lattice_core::postgres::{run_utility_streamed, Utility};

/// A handle for pushing user-visible events onto a MakeCluster stream.
///
/// Operations invoked outside a streaming RPC get a disabled handle whose
/// events land in the hub's own log instead.
#[derive(Clone)]
pub struct HubStream {
    tx: Option<mpsc::Sender<RpcResult<HubReply>>>,
}

impl HubStream {
    pub fn new(tx: mpsc::Sender<RpcResult<HubReply>>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub async fn log(&self, level: LogLevel, message: &str) {
        match &self.tx {
            Some(tx) => {
                let reply = HubReply {
                    message: Some(hub_reply::Message::LogMsg(LogMessage {
                        message: message.to_string(),
                        level: level as i32,
                    })),
                };
                let _res = tx.send(Ok(reply)).await;
            }
            None => match level {
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Warning => tracing::warn!("{}", message),
                LogLevel::Error | LogLevel::Fatal => tracing::error!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
            },
        }
    }

    pub async fn info(&self, message: &str) {
        self.log(LogLevel::Info, message).await;
    }

    pub async fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message).await;
    }

    pub async fn stdout(&self, text: String) {
        if let Some(tx) = &self.tx {
            let reply = HubReply {
                message: Some(hub_reply::Message::StdoutMsg(text)),
            };
            let _res = tx.send(Ok(reply)).await;
        } else {
            tracing::info!("{}", text.trim_end());
        }
    }

    pub async fn progress(&self, label: &str, current: usize, total: usize) {
        if let Some(tx) = &self.tx {
            let reply = HubReply {
                message: Some(hub_reply::Message::ProgressMsg(ProgressMessage {
                    label: label.to_string(),
                    current: current as i32,
                    total: total as i32,
                })),
            };
            let _res = tx.send(Ok(reply)).await;
        }
    }

    /// Send a terminal error, closing the stream with a failed status.
    pub async fn fail(&self, status: tonic::Status) {
        if let Some(tx) = &self.tx {
            let _res = tx.send(Err(status)).await;
        }
    }

    /// Run a utility, forwarding each output line to the stream as it appears.
    pub async fn exec_command(&self, gp_home: &str, utility: &dyn Utility) -> Result<()> {
        let (line_tx, mut line_rx) = mpsc::channel(64);
        let forward = async {
            while let Some(line) = line_rx.recv().await {
                self.stdout(format!("{}\n", line)).await;
            }
        };
        let (res, _) = tokio::join!(run_utility_streamed(gp_home, utility, line_tx), forward);
        res
    }
}

/// A monotonically non-decreasing progress counter for one labeled bar.
///
/// Updates are serialized by the mutex so concurrent segment tasks never
/// send a stale count.
pub struct ProgressCounter {
    stream: HubStream,
    label: String,
    total: usize,
    current: Mutex<usize>,
}

impl ProgressCounter {
    pub fn new(stream: HubStream, label: &str, total: usize) -> Self {
        Self {
            stream,
            label: label.to_string(),
            total,
            current: Mutex::new(0),
        }
    }

    /// Emit the initial zero-progress event.
    pub async fn start(&self) {
        self.stream.progress(&self.label, 0, self.total).await;
    }

    /// Record one completed unit of work.
    pub async fn tick(&self) {
        let current = {
            let mut guard = self.current.lock().expect("progress counter mutex poisoned");
            *guard += 1;
            *guard
        };
        self.stream.progress(&self.label, current, self.total).await;
    }
}
