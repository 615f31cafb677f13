/*!
 * Playback synchronizer.
 *
 * Maps the transport's playback position to the active transcript line and
 * enforces the single-line stop boundary. All methods run on the host's event
 * thread, one at a time; nothing here blocks or locks.
 */

use std::fmt;
use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::collaborators::{Renderer, Transport};
use crate::errors::SyncError;
use crate::transcript::TranscriptSequence;

/// Rewind applied after a single-line stop so the highlight stays on the
/// line that just finished instead of flashing the next one.
pub const BOUNDARY_REWIND_SECS: f64 = 0.1;

/// Playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Stop automatically at the next line's boundary
    #[default]
    Single,
    /// Keep playing through lines
    Continuous,
}

impl PlaybackMode {
    // @returns: The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Single => Self::Continuous,
            Self::Continuous => Self::Single,
        }
    }

    // @returns: Lowercase mode identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Continuous => "continuous",
        }
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlaybackMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "continuous" => Ok(Self::Continuous),
            _ => Err(anyhow!("Invalid playback mode: {}", s)),
        }
    }
}

/// Where single-line playback has to stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopBoundary {
    /// Pause once the position reaches this many seconds
    At(f64),
    /// Last line: let the media play to its natural end
    EndOfMedia,
}

/// Synchronizer state, mutated only through `Synchronizer` methods
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    // @field: Current playback mode
    pub mode: PlaybackMode,

    // @field: Highlighted line, None before the first line
    pub active_line_index: Option<usize>,

    // @field: Pending single-line stop
    pub single_mode_stop_at: Option<StopBoundary>,
}

impl PlaybackState {
    /// Fresh state for the given mode
    pub fn new(mode: PlaybackMode) -> Self {
        PlaybackState {
            mode,
            active_line_index: None,
            single_mode_stop_at: None,
        }
    }

    /// Clear highlight and boundary, keeping the mode
    pub fn reset(&mut self) {
        self.active_line_index = None;
        self.single_mode_stop_at = None;
    }
}

/// Keeps the highlight aligned with playback and cuts single-line playback
/// short at the next line.
///
/// The transport and renderer are owned so the synchronizer can command them
/// directly; hosts reach them through [`Synchronizer::transport_mut`] and
/// [`Synchronizer::renderer`].
pub struct Synchronizer<T: Transport, R: Renderer> {
    transcript: TranscriptSequence,
    state: PlaybackState,
    // Media duration once known
    duration: Option<f64>,
    playback_rate: f64,
    transport: T,
    renderer: R,
}

impl<T: Transport, R: Renderer> Synchronizer<T, R> {
    /// Create a synchronizer with an empty transcript.
    /// The initial playback rate is applied to the transport right away.
    pub fn new(mut transport: T, renderer: R, mode: PlaybackMode, playback_rate: f64) -> Self {
        let playback_rate = if is_valid_rate(playback_rate) {
            playback_rate
        } else {
            warn!("Ignoring invalid playback rate {}, using 1.0", playback_rate);
            1.0
        };
        transport.set_playback_rate(playback_rate);

        Synchronizer {
            transcript: TranscriptSequence::empty(),
            state: PlaybackState::new(mode),
            duration: None,
            playback_rate,
            transport,
            renderer,
        }
    }

    /// Replace the transcript and reset the playback state.
    /// Playback is neither started nor stopped.
    pub fn load_transcript(&mut self, sequence: TranscriptSequence) {
        self.transcript = sequence;
        self.state.reset();

        if self.transcript.is_empty() {
            warn!("Loaded transcript has no timed lines");
            self.renderer.on_no_transcript();
        } else {
            debug!("Loaded transcript with {} lines", self.transcript.len());
            self.renderer.on_transcript_loaded(&self.transcript);
        }
    }

    /// Switch mode. Leaving single mode drops any pending stop boundary.
    pub fn set_mode(&mut self, mode: PlaybackMode) {
        if mode != PlaybackMode::Single && self.state.single_mode_stop_at.is_some() {
            debug!("Clearing single-line boundary on switch to {}", mode);
            self.state.single_mode_stop_at = None;
        }
        self.state.mode = mode;
    }

    /// Flip between single and continuous mode, returning the new mode
    pub fn toggle_mode(&mut self) -> PlaybackMode {
        let mode = self.state.mode.toggled();
        self.set_mode(mode);
        mode
    }

    /// Seek to a line and start playing it.
    ///
    /// In single mode the stop boundary becomes the next line's time, or the
    /// end of the media for the last line. Fails without side effects when
    /// `index` is outside the transcript.
    pub fn jump_to_line(&mut self, index: usize) -> Result<(), SyncError> {
        let len = self.transcript.len();
        let start = self
            .transcript
            .get(index)
            .map(|line| line.time)
            .ok_or(SyncError::IndexOutOfRange { index, len })?;

        self.transport.seek(start);

        self.state.single_mode_stop_at = match self.state.mode {
            PlaybackMode::Single => Some(match self.transcript.get(index + 1) {
                Some(next) => StopBoundary::At(next.time),
                None => StopBoundary::EndOfMedia,
            }),
            PlaybackMode::Continuous => None,
        };

        debug!(
            "Jump to line {} at {:.3}s ({} mode, stop: {:?})",
            index, start, self.state.mode, self.state.single_mode_stop_at
        );

        self.transport.play();
        Ok(())
    }

    /// Handle a position tick from the transport.
    ///
    /// Runs the single-line boundary check, then recomputes the highlight.
    /// When the boundary fires the highlight is computed at the rewound
    /// position, which is where the transport now sits.
    pub fn on_position_advance(&mut self, position: f64, duration: Option<f64>) {
        if let Some(duration) = duration.filter(|d| is_known_duration(*d)) {
            self.duration = Some(duration);
        }

        let position = self.check_boundary(position).unwrap_or(position);
        self.update_highlight(position);
    }

    /// The user (or the transport) paused: any pending boundary is dropped
    pub fn on_pause(&mut self) {
        if self.state.single_mode_stop_at.take().is_some() {
            debug!("Pause cancelled the pending single-line boundary");
        }
    }

    /// End of media. Continuous mode moves on to the line after the active
    /// one when there is one; single mode does nothing.
    pub fn on_media_ended(&mut self) {
        match self.state.mode {
            PlaybackMode::Continuous => {
                let next = self.state.active_line_index.map_or(0, |index| index + 1);
                match self.transcript.get(next) {
                    Some(line) => {
                        debug!("Continuing with line {} at {:.3}s", next, line.time);
                        self.transport.seek(line.time);
                        self.transport.play();
                    }
                    None => info!("Reached the last line"),
                }
            }
            PlaybackMode::Single => info!("Single-line playback finished"),
        }
    }

    /// Media metadata arrived with the total duration
    pub fn on_metadata_loaded(&mut self, duration: f64) {
        if is_known_duration(duration) {
            self.duration = Some(duration);
        } else {
            warn!("Ignoring unusable media duration {}", duration);
        }
    }

    /// Change playback speed on the transport
    pub fn set_playback_rate(&mut self, multiplier: f64) {
        if !is_valid_rate(multiplier) {
            warn!("Ignoring invalid playback rate {}", multiplier);
            return;
        }
        self.playback_rate = multiplier;
        self.transport.set_playback_rate(multiplier);
        info!("Playback speed: {}x", multiplier);
    }

    /// Reset highlight and boundary without touching the transcript
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode
    }

    pub fn active_line_index(&self) -> Option<usize> {
        self.state.active_line_index
    }

    /// Pending stop position in seconds. For the last line this is the media
    /// duration, or `None` while the duration is unknown.
    pub fn single_mode_stop_at(&self) -> Option<f64> {
        match self.state.single_mode_stop_at? {
            StopBoundary::At(seconds) => Some(seconds),
            StopBoundary::EndOfMedia => self.duration,
        }
    }

    pub fn stop_boundary(&self) -> Option<StopBoundary> {
        self.state.single_mode_stop_at
    }

    pub fn transcript(&self) -> &TranscriptSequence {
        &self.transcript
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // @returns: Rewound position when the boundary fired
    fn check_boundary(&mut self, position: f64) -> Option<f64> {
        if self.state.mode != PlaybackMode::Single {
            return None;
        }

        // EndOfMedia never fires; the media ending is the stop condition.
        let Some(StopBoundary::At(stop_at)) = self.state.single_mode_stop_at else {
            return None;
        };

        if position.is_nan() || position < stop_at {
            return None;
        }

        let rewind_to = (stop_at - BOUNDARY_REWIND_SECS).max(0.0);
        self.transport.pause();
        self.transport.seek(rewind_to);
        self.state.single_mode_stop_at = None;

        info!("Single-line playback finished at {:.3}s", stop_at);
        Some(rewind_to)
    }

    fn update_highlight(&mut self, position: f64) {
        let new_index = self.transcript.active_index_at(position);
        if new_index != self.state.active_line_index {
            self.state.active_line_index = new_index;
            self.renderer.on_line_activated(new_index);
        }
    }
}

fn is_known_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}
