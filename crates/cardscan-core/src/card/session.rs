//! Scan session: one guarded classification pass per frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::scanner::{CardScanner, ScanState};
use crate::error::Result;
use crate::models::card::{CreditCardModel, FieldKind};
use crate::models::config::ScanConfig;
use crate::ocr::{Frame, TextRecognizer};

/// What happened to a submitted frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// A pass was already in flight; the frame was ignored.
    Dropped { frame_id: u64 },
    /// The frame was processed but the card is not complete yet.
    Pending { frame_id: u64, filled: Vec<FieldKind> },
    /// The frame completed the card.
    Emitted { frame_id: u64, card: CreditCardModel },
}

impl FrameOutcome {
    pub fn frame_id(&self) -> u64 {
        match self {
            FrameOutcome::Dropped { frame_id }
            | FrameOutcome::Pending { frame_id, .. }
            | FrameOutcome::Emitted { frame_id, .. } => *frame_id,
        }
    }

    /// The emitted card, if this frame completed one.
    pub fn card(&self) -> Option<&CreditCardModel> {
        match self {
            FrameOutcome::Emitted { card, .. } => Some(card),
            _ => None,
        }
    }

    pub fn into_card(self) -> Option<CreditCardModel> {
        match self {
            FrameOutcome::Emitted { card, .. } => Some(card),
            _ => None,
        }
    }
}

/// Clears the busy flag when the pass ends, whichever path it takes.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives a [`CardScanner`] from a [`TextRecognizer`], one frame at a time.
///
/// At most one pass runs at once. Frames submitted while a pass (including
/// its cooldown) is in flight are dropped, not queued.
pub struct ScanSession<R: TextRecognizer> {
    recognizer: R,
    scanner: Mutex<CardScanner>,
    busy: AtomicBool,
    cooldown: Duration,
    surface_failures: bool,
}

impl<R: TextRecognizer> ScanSession<R> {
    /// Start a session with a fresh scanner.
    pub fn new(recognizer: R, config: ScanConfig) -> Result<Self> {
        Ok(Self::with_scanner(recognizer, CardScanner::new(config)?))
    }

    /// Start a session around an existing scanner.
    pub fn with_scanner(recognizer: R, scanner: CardScanner) -> Self {
        let cooldown = scanner.config().cooldown();
        let surface_failures = scanner.config().debug_logging;

        debug!(
            "Starting scan session with {} recognizer, cooldown {:?}",
            recognizer.name(),
            cooldown
        );

        Self {
            recognizer,
            scanner: Mutex::new(scanner),
            busy: AtomicBool::new(false),
            cooldown,
            surface_failures,
        }
    }

    /// Whether a pass is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Recognize a frame and classify its lines.
    ///
    /// A recognition failure skips classification. It is returned as an
    /// error only when debug logging is enabled; otherwise it is logged and
    /// the frame counts as having no lines. The cooldown runs either way.
    pub async fn submit(&self, frame: Frame<R::Payload>) -> Result<FrameOutcome> {
        let Some(_guard) = self.try_acquire() else {
            debug!("Dropping frame {}: pass in flight", frame.id);
            return Ok(FrameOutcome::Dropped { frame_id: frame.id });
        };

        let outcome = match self.recognizer.recognize(&frame) {
            Ok(lines) => Ok(self.classify(frame.id, lines.as_slice()).await),
            Err(e) if self.surface_failures => {
                warn!("Recognition failed on frame {}: {}", frame.id, e);
                Err(e.into())
            }
            Err(e) => {
                warn!("Recognition failed on frame {}: {}", frame.id, e);
                Ok(self.pending(frame.id).await)
            }
        };

        self.cool_down().await;
        outcome
    }

    /// Classify lines that were recognized elsewhere, under the same guard.
    pub async fn submit_lines<S: AsRef<str>>(&self, frame_id: u64, lines: &[S]) -> FrameOutcome {
        let Some(_guard) = self.try_acquire() else {
            debug!("Dropping frame {}: pass in flight", frame_id);
            return FrameOutcome::Dropped { frame_id };
        };

        let outcome = self.classify(frame_id, lines).await;
        self.cool_down().await;
        outcome
    }

    /// Discard accumulated fields and start a new scan.
    pub async fn reset(&self) {
        self.scanner.lock().await.reset();
    }

    pub async fn state(&self) -> ScanState {
        self.scanner.lock().await.state()
    }

    /// Cards emitted by this session so far.
    pub async fn emissions(&self) -> u64 {
        self.scanner.lock().await.emissions()
    }

    /// Fields accumulated so far.
    pub async fn filled(&self) -> Vec<FieldKind> {
        self.scanner.lock().await.accumulator().filled()
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    async fn classify<S: AsRef<str>>(&self, frame_id: u64, lines: &[S]) -> FrameOutcome {
        let mut scanner = self.scanner.lock().await;

        match scanner.process_batch(lines) {
            Some(card) => {
                info!("Frame {} completed the card", frame_id);
                FrameOutcome::Emitted { frame_id, card }
            }
            None => FrameOutcome::Pending {
                frame_id,
                filled: scanner.accumulator().filled(),
            },
        }
    }

    async fn pending(&self, frame_id: u64) -> FrameOutcome {
        FrameOutcome::Pending {
            frame_id,
            filled: self.scanner.lock().await.accumulator().filled(),
        }
    }

    async fn cool_down(&self) {
        if !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }
    }
}
