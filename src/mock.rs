/*!
 * Recording collaborators for testing.
 *
 * - `MockTransport` records every command it receives
 * - `MockRenderer` records every notification it receives
 *
 * Both are plain values; inspect them through `Synchronizer::transport()` and
 * `Synchronizer::renderer()`.
 */

use crate::collaborators::{Renderer, Transport};
use crate::transcript::TranscriptSequence;

/// Command issued to a transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    Seek(f64),
    Play,
    Pause,
    SetPlaybackRate(f64),
}

/// Transport that only records commands
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Commands in the order they were issued
    pub commands: Vec<TransportCommand>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Seek targets in order
    pub fn seeks(&self) -> Vec<f64> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                TransportCommand::Seek(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn play_count(&self) -> usize {
        self.commands.iter().filter(|c| **c == TransportCommand::Play).count()
    }

    pub fn pause_count(&self) -> usize {
        self.commands.iter().filter(|c| **c == TransportCommand::Pause).count()
    }
}

impl Transport for MockTransport {
    fn seek(&mut self, seconds: f64) {
        self.commands.push(TransportCommand::Seek(seconds));
    }

    fn play(&mut self) {
        self.commands.push(TransportCommand::Play);
    }

    fn pause(&mut self) {
        self.commands.push(TransportCommand::Pause);
    }

    fn set_playback_rate(&mut self, multiplier: f64) {
        self.commands.push(TransportCommand::SetPlaybackRate(multiplier));
    }
}

/// Notification delivered to a renderer
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    TranscriptLoaded(usize),
    LineActivated(Option<usize>),
    NoTranscript,
}

/// Renderer that only records notifications
#[derive(Debug, Default)]
pub struct MockRenderer {
    /// Notifications in the order they arrived
    pub events: Vec<RenderEvent>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Highlight notifications only
    pub fn activations(&self) -> Vec<Option<usize>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::LineActivated(index) => Some(*index),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for MockRenderer {
    fn on_transcript_loaded(&mut self, sequence: &TranscriptSequence) {
        self.events.push(RenderEvent::TranscriptLoaded(sequence.len()));
    }

    fn on_line_activated(&mut self, index: Option<usize>) {
        self.events.push(RenderEvent::LineActivated(index));
    }

    fn on_no_transcript(&mut self) {
        self.events.push(RenderEvent::NoTranscript);
    }
}
