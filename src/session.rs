use log::{debug, info, warn};

use crate::book::UnitDescriptor;
use crate::collaborators::{KeyValueStore, Renderer, Transport};
use crate::errors::{BookError, StoreError};
use crate::synchronizer::Synchronizer;
use crate::transcript;

// @module: Reading session - unit navigation and remembered preferences

/// Store key for the preferred playback rate
pub const PLAYBACK_RATE_KEY: &str = "playbackRate";

/// Speeds offered when cycling the playback rate
pub const DEFAULT_AVAILABLE_SPEEDS: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Rate used when nothing usable is stored
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

/// Handle for one unit load. Only the most recently issued ticket may commit
/// its transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    // @field: Load generation this ticket belongs to
    generation: u64,

    // @field: Unit being loaded
    pub unit: UnitDescriptor,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks the current unit of a book and the user's preferences
pub struct ReadingSession<S: KeyValueStore> {
    // @field: Base path of the book, also namespaces the unit key
    book_path: String,
    units: Vec<UnitDescriptor>,
    store: S,
    current_unit: Option<usize>,
    playback_rate: f64,
    available_speeds: Vec<f64>,
    default_rate: f64,
    // @field: Last issued load generation
    generation: u64,
}

impl<S: KeyValueStore> ReadingSession<S> {
    /// Create a session with the default speed list
    pub fn new(book_path: impl Into<String>, units: Vec<UnitDescriptor>, store: S) -> Self {
        Self::with_speeds(book_path, units, store, DEFAULT_AVAILABLE_SPEEDS.to_vec(), DEFAULT_PLAYBACK_RATE)
    }

    /// Create a session with a custom speed list and default rate
    pub fn with_speeds(
        book_path: impl Into<String>,
        units: Vec<UnitDescriptor>,
        store: S,
        available_speeds: Vec<f64>,
        default_rate: f64,
    ) -> Self {
        let available_speeds: Vec<f64> = available_speeds.into_iter().filter(|speed| is_valid_rate(*speed)).collect();
        let available_speeds = if available_speeds.is_empty() {
            DEFAULT_AVAILABLE_SPEEDS.to_vec()
        } else {
            available_speeds
        };
        let default_rate = if is_valid_rate(default_rate) { default_rate } else { DEFAULT_PLAYBACK_RATE };

        let mut session = ReadingSession {
            book_path: book_path.into(),
            units,
            store,
            current_unit: None,
            playback_rate: default_rate,
            available_speeds,
            default_rate,
            generation: 0,
        };
        session.playback_rate = session.saved_playback_rate();
        session
    }

    /// Store key for the current unit index of this book
    pub fn unit_index_key(&self) -> String {
        format!("{}/currentUnitIndex", self.book_path)
    }

    /// Unit to open first: the remembered one when valid, else the first.
    /// `None` when the book has no units.
    pub fn initial_unit_index(&self) -> Option<usize> {
        if self.units.is_empty() {
            return None;
        }

        let stored = match self.store.get(&self.unit_index_key()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read remembered unit: {}", e);
                None
            }
        };

        let remembered = stored
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|index| *index < self.units.len());

        Some(remembered.unwrap_or(0))
    }

    /// Remembered playback rate, or the default when missing or unusable
    pub fn saved_playback_rate(&self) -> f64 {
        let stored = match self.store.get(PLAYBACK_RATE_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read remembered playback rate: {}", e);
                None
            }
        };

        stored
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|rate| is_valid_rate(*rate))
            .unwrap_or(self.default_rate)
    }

    /// Make `index` the current unit and start a new load for it.
    /// Any ticket issued earlier becomes stale.
    pub fn select_unit(&mut self, index: usize) -> Result<LoadTicket, BookError> {
        let unit = self
            .units
            .get(index)
            .cloned()
            .ok_or(BookError::UnitOutOfRange {
                index,
                count: self.units.len(),
            })?;

        self.current_unit = Some(index);
        if let Err(e) = self.store.set(&self.unit_index_key(), &index.to_string()) {
            warn!("Failed to remember current unit: {}", e);
        }

        self.generation += 1;
        info!("Loading unit {}: {}", unit.id(), unit.title);

        Ok(LoadTicket {
            generation: self.generation,
            unit,
        })
    }

    /// Load the unit before the current one, if any
    pub fn previous_unit(&mut self) -> Option<LoadTicket> {
        let current = self.current_unit?;
        if current == 0 {
            return None;
        }
        self.select_unit(current - 1).ok()
    }

    /// Load the unit after the current one, if any
    pub fn next_unit(&mut self) -> Option<LoadTicket> {
        if !self.has_next() {
            return None;
        }
        let next = self.current_unit.map_or(0, |current| current + 1);
        self.select_unit(next).ok()
    }

    pub fn has_previous(&self) -> bool {
        self.current_unit.is_some_and(|current| current > 0)
    }

    pub fn has_next(&self) -> bool {
        match self.current_unit {
            Some(current) => current + 1 < self.units.len(),
            None => !self.units.is_empty(),
        }
    }

    /// Whether `ticket` belongs to the most recent load
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Parse fetched transcript text and hand it to the synchronizer, unless a
    /// newer load has started since `ticket` was issued.
    ///
    /// Returns `true` when the transcript was committed.
    pub fn commit_transcript<T: Transport, R: Renderer>(
        &self,
        ticket: &LoadTicket,
        raw: &str,
        synchronizer: &mut Synchronizer<T, R>,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale transcript for unit {} (load {} superseded by {})",
                ticket.unit.id(),
                ticket.generation,
                self.generation
            );
            return false;
        }

        synchronizer.load_transcript(transcript::parse(raw));
        true
    }

    /// Switch to the next speed in the list (wrapping) and remember it.
    /// An unlisted current rate restarts at the first speed.
    pub fn cycle_playback_rate(&mut self) -> Result<f64, StoreError> {
        let next = match self
            .available_speeds
            .iter()
            .position(|speed| (speed - self.playback_rate).abs() < f64::EPSILON)
        {
            Some(index) => self.available_speeds[(index + 1) % self.available_speeds.len()],
            None => self.available_speeds[0],
        };

        self.set_playback_rate(next)?;
        Ok(next)
    }

    /// Set and remember the playback rate. Non-positive and non-finite rates
    /// are ignored and nothing is stored; returns whether the rate was taken.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<bool, StoreError> {
        if !is_valid_rate(rate) {
            warn!("Ignoring invalid playback rate {}", rate);
            return Ok(false);
        }
        self.playback_rate = rate;
        self.store.set(PLAYBACK_RATE_KEY, &rate.to_string())?;
        Ok(true)
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn current_unit_index(&self) -> Option<usize> {
        self.current_unit
    }

    pub fn current_unit(&self) -> Option<&UnitDescriptor> {
        self.current_unit.and_then(|index| self.units.get(index))
    }

    pub fn units(&self) -> &[UnitDescriptor] {
        &self.units
    }

    pub fn book_path(&self) -> &str {
        &self.book_path
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}
