//! CLI signal handling.
//!
//! SIGINT pauses stream consumption and prompts for confirmation; SIGTERM
//! requests termination immediately; SIGHUP is ignored so a dropped terminal
//! does not kill a running initialization.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;

use crate::logger;
use crate::stream::{StreamController, StreamState};
use crate::user_input;

const PROMPT: &str = "Do you want to continue terminating the current execution?";

/// Specific error for a user-confirmed termination.
#[derive(Debug, thiserror::Error)]
#[error("program was terminated by the user")]
pub struct UserTermination;

/// Install the CLI signal handlers.
///
/// `termination_requested` is the flag the CLI checks at safe points; a
/// confirmed SIGINT or any SIGTERM sets it.
pub fn spawn_signal_handler(ctrl: Arc<StreamController>, termination_requested: Arc<AtomicBool>) -> Result<JoinHandle<()>> {
    let mut sigint = signal(SignalKind::interrupt()).context("error building signal stream")?;
    let mut sigterm = signal(SignalKind::terminate()).context("error building signal stream")?;
    let mut sighup = signal(SignalKind::hangup()).context("error building signal stream")?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigint.recv() => handle_sigint(&ctrl, &termination_requested).await,
                _ = sigterm.recv() => {
                    logger::warn("received a termination signal");
                    termination_requested.store(true, Ordering::SeqCst);
                }
                _ = sighup.recv() => {}
            }
        }
    }))
}

async fn handle_sigint(ctrl: &StreamController, termination_requested: &AtomicBool) {
    if ctrl.state() != StreamState::NotStarted {
        // Pause the hub stream parsing so the prompt renders cleanly, and
        // wait until the consumer actually stopped.
        ctrl.set_state(StreamState::Paused);
        ctrl.wait_until_paused().await;
        logger::warn("received an interrupt signal");
        let terminate = user_input::ask_user_yes_or_no(PROMPT).await;
        if terminate {
            termination_requested.store(true, Ordering::SeqCst);
            // Discard all the stream responses that arrive while the
            // termination takes effect.
            ctrl.set_state(StreamState::Discard);
        } else {
            ctrl.set_state(StreamState::Running);
        }
    } else {
        logger::warn("received an interrupt signal");
        let terminate = user_input::ask_user_yes_or_no(PROMPT).await;
        termination_requested.store(terminate, Ordering::SeqCst);
    }
}
