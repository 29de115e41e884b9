//! CLI-side consumer of the hub's MakeCluster event stream.

use std::sync::Mutex;

use anyhow::Result;
use tokio::sync::{mpsc, watch, Mutex as TokioMutex};
use tonic::{Status, Streaming};

use crate::logger;
use crate::progress::ProgressContainer;
use lattice_core::error::format_grpc_error;
use lattice_core::idl::{HubReply, HubReplyMessage, LogLevel};

/// The consumption states of a hub stream.
///
/// - `NotStarted`: the stream has not been started yet
/// - `Running`: the stream is currently being consumed
/// - `Paused`: consumption is suspended until a resume signal
/// - `Discard`: responses are drained but dropped, errors still terminate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    NotStarted,
    Running,
    Paused,
    Discard,
}

/// Coordinates pausing, resuming and discarding of stream consumption
/// between the consumer loop and the signal handler.
pub struct StreamController {
    state: Mutex<StreamState>,
    state_tx: watch::Sender<StreamState>,
    state_rx: watch::Receiver<StreamState>,
    paused_tx: mpsc::Sender<()>,
    paused_rx: TokioMutex<mpsc::Receiver<()>>,
    resume_tx: mpsc::Sender<()>,
    resume_rx: TokioMutex<mpsc::Receiver<()>>,
}

impl StreamController {
    pub fn new() -> Self {
        let (state_tx, state_rx) = watch::channel(StreamState::NotStarted);
        let (paused_tx, paused_rx) = mpsc::channel(1);
        let (resume_tx, resume_rx) = mpsc::channel(1);
        Self {
            state: Mutex::new(StreamState::NotStarted),
            state_tx,
            state_rx,
            paused_tx,
            paused_rx: TokioMutex::new(paused_rx),
            resume_tx,
            resume_rx: TokioMutex::new(resume_rx),
        }
    }

    /// Set the state; a transition back to `Running` or into `Discard`
    /// signals the resume channel so a paused consumer wakes up.
    pub fn set_state(&self, state: StreamState) {
        {
            let mut guard = self.state.lock().expect("stream state mutex poisoned");
            if (*guard != StreamState::NotStarted && state == StreamState::Running) || state == StreamState::Discard {
                // Capacity 1 coalesces spurious resumes.
                let _res = self.resume_tx.try_send(());
            }
            *guard = state;
        }
        let _res = self.state_tx.send(state);
    }

    pub fn state(&self) -> StreamState {
        *self.state.lock().expect("stream state mutex poisoned")
    }

    /// Report that the consumer has actually stopped; `set_state(Paused)`
    /// only requests the pause, this marks the moment it took effect.
    pub fn paused(&self) {
        let _res = self.paused_tx.try_send(());
    }

    /// Block until the consumer reports it is paused.
    pub async fn wait_until_paused(&self) {
        self.paused_rx.lock().await.recv().await;
    }

    /// Block until a resume (or discard) signal arrives.
    pub async fn wait_until_resumed(&self) {
        self.resume_rx.lock().await.recv().await;
    }

    /// A watcher that wakes whenever the state changes.
    pub fn state_watcher(&self) -> watch::Receiver<StreamState> {
        self.state_rx.clone()
    }
}

/// Consume the hub stream, rendering its events, until end-of-stream.
///
/// End-of-stream is success; any other stream error aborts the progress
/// bars and propagates.
pub async fn parse_stream_response(mut stream: Streaming<HubReply>, ctrl: &StreamController) -> Result<()> {
    let progress = ProgressContainer::new();
    let (resp_tx, mut resp_rx) = mpsc::channel::<HubReply>(16);
    let (err_tx, mut err_rx) = mpsc::channel::<Option<Status>>(1);

    ctrl.set_state(StreamState::Running);

    tokio::spawn(async move {
        loop {
            match stream.message().await {
                Ok(Some(reply)) => {
                    if resp_tx.send(reply).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    let _res = err_tx.send(None).await;
                    return;
                }
                Err(status) => {
                    let _res = err_tx.send(Some(status)).await;
                    return;
                }
            }
        }
    });

    let mut state_rx = ctrl.state_watcher();
    loop {
        let state = ctrl.state();
        if state == StreamState::Paused {
            progress.abort();
            ctrl.paused();
            ctrl.wait_until_resumed().await;
            continue;
        }

        tokio::select! {
            reply = resp_rx.recv() => {
                if let Some(reply) = reply {
                    if ctrl.state() == StreamState::Discard {
                        continue;
                    }
                    render_reply(reply, &progress);
                }
            }
            err = err_rx.recv() => {
                // Render whatever the producer buffered ahead of the end of
                // the stream before acting on it.
                while let Ok(reply) = resp_rx.try_recv() {
                    if ctrl.state() != StreamState::Discard {
                        render_reply(reply, &progress);
                    }
                }
                match err.flatten() {
                    // A clean end of stream means the operation succeeded.
                    None => break,
                    Some(status) => {
                        progress.abort();
                        return Err(format_grpc_error(status));
                    }
                }
            },
            _ = state_rx.changed() => continue,
        }
    }

    Ok(())
}

fn render_reply(reply: HubReply, progress: &ProgressContainer) {
    match reply.message {
        Some(HubReplyMessage::LogMsg(log)) => {
            let level = LogLevel::from_i32(log.level).unwrap_or(LogLevel::Info);
            logger::log_level(level, &log.message);
        }
        Some(HubReplyMessage::StdoutMsg(text)) => print!("{}", text),
        Some(HubReplyMessage::ProgressMsg(msg)) => progress.update(&msg.label, msg.current, msg.total),
        None => {}
    }
}
