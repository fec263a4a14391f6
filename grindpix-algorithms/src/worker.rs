//! Background analysis worker.
//!
//! Runs one analysis on its own thread and reports progress and completion
//! over a channel the caller owns, so the caller chooses where results are
//! handled.

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use grindpix_core::{AnalysisOutcome, CalibrationSource, Error, GrayImage};

use crate::cancel::CancellationToken;
use crate::processing::{run, AnalysisConfig};

/// Messages sent from the worker thread.
#[derive(Debug)]
pub enum AnalysisMessage {
    /// Fraction complete in `[0, 1]` and the current stage.
    Progress(f32, String),
    /// Analysis finished; includes the no-particles outcome.
    Complete(Box<AnalysisOutcome>),
    /// Analysis failed or was cancelled.
    Failed(Error),
}

/// Handle to a running analysis.
#[derive(Debug)]
pub struct AnalysisHandle {
    cancel: CancellationToken,
    thread: JoinHandle<()>,
}

impl AnalysisHandle {
    /// Requests cooperative cancellation.
    ///
    /// The worker stops at its next check and sends
    /// `Failed(Error::Cancelled)`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the cancellation token.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Blocks until the worker thread exits.
    ///
    /// # Errors
    /// [`Error::InternalComputation`] if the worker panicked.
    pub fn wait(self) -> grindpix_core::Result<()> {
        self.thread
            .join()
            .map_err(|_| Error::InternalComputation("analysis worker panicked".to_string()))
    }
}

/// Starts an analysis of `image` on a new thread.
///
/// Exactly one `Complete` or `Failed` message is sent, preceded by any
/// number of `Progress` messages. A dropped receiver is not an error; the
/// worker simply finishes without reporting.
#[must_use]
pub fn spawn_analysis(
    image: GrayImage,
    source: CalibrationSource,
    config: AnalysisConfig,
    tx: Sender<AnalysisMessage>,
) -> AnalysisHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let thread = thread::spawn(move || {
        let progress_tx = tx.clone();
        let mut progress = |fraction: f32, stage: &str| {
            let _ = progress_tx.send(AnalysisMessage::Progress(fraction, stage.to_string()));
        };
        let message = match run(&image, &source, &config, Some(&token), &mut progress) {
            Ok(outcome) => AnalysisMessage::Complete(Box::new(outcome)),
            Err(e) => {
                log::debug!("analysis worker stopped: {e}");
                AnalysisMessage::Failed(e)
            }
        };
        let _ = tx.send(message);
    });
    AnalysisHandle { cancel, thread }
}
