/*!
 * Interfaces between the playback core and its surroundings.
 *
 * The synchronizer issues commands to a [`Transport`] and notifications to a
 * [`Renderer`]; the reading session keeps user preferences in a
 * [`KeyValueStore`]. Implementations live elsewhere (`transport`, `console`,
 * `store`) or in the embedding application.
 */

use crate::errors::StoreError;
use crate::transcript::TranscriptSequence;

/// Audio transport driven by the synchronizer.
///
/// Events flowing the other way (position ticks, pause, end of media,
/// metadata) are delivered by the host calling the matching
/// `Synchronizer::on_*` method.
pub trait Transport {
    /// Move the playhead to `seconds`
    fn seek(&mut self, seconds: f64);

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Set the playback speed multiplier
    fn set_playback_rate(&mut self, multiplier: f64);
}

/// Rendering surface notified about transcript and highlight changes
pub trait Renderer {
    /// A non-empty transcript was loaded
    fn on_transcript_loaded(&mut self, sequence: &TranscriptSequence);

    /// The highlighted line changed; `None` clears the highlight
    fn on_line_activated(&mut self, index: Option<usize>);

    /// The loaded transcript has no lines
    fn on_no_transcript(&mut self);
}

/// String key/value persistence
pub trait KeyValueStore {
    /// Read a value, `None` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
