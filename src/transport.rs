/*!
 * Simulated audio transport.
 *
 * A virtual playhead that advances with wall-clock time scaled by the
 * playback rate. It decodes nothing; it exists so a unit can be "played"
 * against its transcript from the terminal, and it reports the same events a
 * media element would (pause, end of media).
 */

use std::time::Duration;
use log::{debug, trace};

use crate::collaborators::{Renderer, Transport};
use crate::synchronizer::Synchronizer;

/// Event raised by the transport for the host to forward to the synchronizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Playback paused while it was running
    Paused,
    /// The playhead reached the end of the media
    Ended,
}

/// Clock-driven transport without audio output
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    position: f64,
    duration: Option<f64>,
    rate: f64,
    playing: bool,
    events: Vec<TransportEvent>,
}

impl SimulatedTransport {
    /// Transport for media of the given length; `None` while unknown
    pub fn new(duration: Option<f64>) -> Self {
        SimulatedTransport {
            position: 0.0,
            duration,
            rate: 1.0,
            playing: false,
            events: Vec::new(),
        }
    }

    /// Move the playhead by `elapsed` wall-clock time. Returns the new position.
    pub fn advance(&mut self, elapsed: Duration) -> f64 {
        if !self.playing {
            return self.position;
        }

        self.position += elapsed.as_secs_f64() * self.rate;

        if let Some(duration) = self.duration {
            if self.position >= duration {
                self.position = duration;
                self.playing = false;
                self.events.push(TransportEvent::Ended);
            }
        }

        trace!("Playhead at {:.3}s", self.position);
        self.position
    }

    /// Drain events raised since the last call
    pub fn take_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = duration;
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the playhead sits at the end of the media
    pub fn is_at_end(&self) -> bool {
        self.duration.is_some_and(|duration| self.position >= duration)
    }
}

impl Transport for SimulatedTransport {
    fn seek(&mut self, seconds: f64) {
        let upper = self.duration.filter(|d| *d >= 0.0).unwrap_or(f64::INFINITY);
        self.position = seconds.clamp(0.0, upper);
    }

    fn play(&mut self) {
        if self.is_at_end() {
            self.position = 0.0;
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.events.push(TransportEvent::Paused);
        }
    }

    fn set_playback_rate(&mut self, multiplier: f64) {
        self.rate = multiplier;
    }
}

/// Result of one [`drive_tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Playhead position after the tick
    pub position: f64,
    /// Playback is no longer running
    pub stopped: bool,
}

/// Move the playhead by `elapsed` and hand the new position and any raised
/// events to the synchronizer.
///
/// The end of the media ends the run. When end-of-media handling asks for a
/// line that lies past the end (a media shorter than its transcript), the
/// transport is stopped again at the end instead of restarting from zero.
pub fn drive_tick<R: Renderer>(
    synchronizer: &mut Synchronizer<SimulatedTransport, R>,
    elapsed: Duration,
) -> TickOutcome {
    let position = synchronizer.transport_mut().advance(elapsed);
    let duration = synchronizer.transport().duration();
    synchronizer.on_position_advance(position, duration);

    let mut ended_at = None;
    for event in synchronizer.transport_mut().take_events() {
        match event {
            TransportEvent::Paused => synchronizer.on_pause(),
            TransportEvent::Ended => {
                ended_at = Some(synchronizer.transport().position());
                synchronizer.on_media_ended();
            }
        }
    }

    if let Some(end) = ended_at {
        let transport = synchronizer.transport_mut();
        if transport.is_playing() {
            debug!("Next line starts past the end of the media, stopping at {:.3}s", end);
            transport.pause();
            transport.seek(end);
            transport.take_events();
        }
    }

    let transport = synchronizer.transport();
    TickOutcome {
        position: transport.position(),
        stopped: !transport.is_playing(),
    }
}
