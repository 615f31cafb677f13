/*!
 * Tests for highlight tracking and single-line playback
 */

use readalong::errors::SyncError;
use readalong::mock::{MockRenderer, MockTransport, RenderEvent, TransportCommand};
use readalong::synchronizer::{PlaybackMode, StopBoundary, Synchronizer, BOUNDARY_REWIND_SECS};
use readalong::transcript::{self, TranscriptSequence};

use crate::common::{loaded_synchronizer, SAMPLE_TRANSCRIPT};

#[test]
fn test_new_shouldApplyInitialRateToTransport() {
    let synchronizer = Synchronizer::new(MockTransport::new(), MockRenderer::new(), PlaybackMode::Single, 1.25);

    assert_eq!(synchronizer.transport().commands, vec![TransportCommand::SetPlaybackRate(1.25)]);
    assert_eq!(synchronizer.playback_rate(), 1.25);
    assert_eq!(synchronizer.mode(), PlaybackMode::Single);
}

#[test]
fn test_new_withInvalidRate_shouldFallBackToNormalSpeed() {
    let synchronizer = Synchronizer::new(MockTransport::new(), MockRenderer::new(), PlaybackMode::Single, 0.0);
    assert_eq!(synchronizer.playback_rate(), 1.0);
}

#[test]
fn test_loadTranscript_shouldNotifyRendererAndResetState() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(0).expect("valid line");
    synchronizer.on_position_advance(1.2, None);
    assert_eq!(synchronizer.active_line_index(), Some(0));

    synchronizer.load_transcript(transcript::parse("[00:01.500]Other"));

    assert_eq!(synchronizer.active_line_index(), None);
    assert!(synchronizer.stop_boundary().is_none());
    assert_eq!(synchronizer.renderer().events.last(), Some(&RenderEvent::TranscriptLoaded(1)));
}

#[test]
fn test_loadTranscript_withEmptySequence_shouldReportNoTranscript() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.load_transcript(TranscriptSequence::empty());

    assert_eq!(synchronizer.renderer().events, vec![RenderEvent::NoTranscript]);
    assert!(synchronizer.transport().commands.is_empty());
}

#[test]
fn test_onPositionAdvance_shouldHighlightOnlyOnChange() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Continuous);

    for position in [0.5, 1.0, 1.5, 4.9, 5.0, 5.5] {
        synchronizer.on_position_advance(position, None);
    }

    assert_eq!(synchronizer.renderer().activations(), vec![Some(0), Some(1), Some(2)]);
    assert_eq!(synchronizer.active_line_index(), Some(2));
}

#[test]
fn test_onPositionAdvance_seekingBack_shouldClearHighlight() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Continuous);
    synchronizer.on_position_advance(3.2, None);
    synchronizer.on_position_advance(0.2, None);

    assert_eq!(synchronizer.renderer().activations(), vec![Some(1), None]);
    assert_eq!(synchronizer.active_line_index(), None);
}

#[test]
fn test_jumpToLine_inSingleMode_shouldSeekPlayAndSetBoundary() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(0).expect("valid line");

    assert_eq!(
        synchronizer.transport().commands,
        vec![TransportCommand::Seek(1.0), TransportCommand::Play]
    );
    assert_eq!(synchronizer.stop_boundary(), Some(StopBoundary::At(3.0)));
    assert_eq!(synchronizer.single_mode_stop_at(), Some(3.0));
}

#[test]
fn test_jumpToLine_inContinuousMode_shouldNotSetBoundary() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Continuous);
    synchronizer.jump_to_line(1).expect("valid line");

    assert_eq!(synchronizer.transport().seeks(), vec![3.0]);
    assert_eq!(synchronizer.transport().play_count(), 1);
    assert!(synchronizer.stop_boundary().is_none());
}

#[test]
fn test_jumpToLine_outOfRange_shouldFailWithoutSideEffects() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    let result = synchronizer.jump_to_line(3);

    assert_eq!(result, Err(SyncError::IndexOutOfRange { index: 3, len: 3 }));
    assert!(synchronizer.transport().commands.is_empty());
    assert!(synchronizer.stop_boundary().is_none());
}

#[test]
fn test_boundary_whenReached_shouldPauseAndRewindOnce() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(0).expect("valid line");
    synchronizer.transport_mut().clear();

    synchronizer.on_position_advance(2.5, None);
    assert!(synchronizer.transport().commands.is_empty());

    synchronizer.on_position_advance(3.05, None);
    assert_eq!(
        synchronizer.transport().commands,
        vec![TransportCommand::Pause, TransportCommand::Seek(3.0 - BOUNDARY_REWIND_SECS)]
    );
    assert!(synchronizer.stop_boundary().is_none());

    // A late tick past the boundary must not fire again
    synchronizer.on_position_advance(3.1, None);
    assert_eq!(synchronizer.transport().pause_count(), 1);
}

#[test]
fn test_boundary_whenFired_shouldKeepPlayedLineHighlighted() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(0).expect("valid line");
    synchronizer.on_position_advance(1.5, None);
    synchronizer.on_position_advance(3.0, None);

    assert_eq!(synchronizer.active_line_index(), Some(0));
    assert_eq!(synchronizer.renderer().activations(), vec![Some(0)]);
}

#[test]
fn test_boundary_atZero_shouldClampRewindTarget() {
    let raw = "[00:00.500]Start\n[00:00.550]Next";
    let mut synchronizer = loaded_synchronizer(raw, PlaybackMode::Single);
    synchronizer.jump_to_line(0).expect("valid line");
    synchronizer.transport_mut().clear();

    synchronizer.on_position_advance(0.06, None);

    assert_eq!(synchronizer.transport().seeks(), vec![0.0]);
}

#[test]
fn test_boundary_onLastLine_shouldNeverFire() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.on_metadata_loaded(8.0);
    synchronizer.jump_to_line(2).expect("valid line");
    synchronizer.transport_mut().clear();

    assert_eq!(synchronizer.stop_boundary(), Some(StopBoundary::EndOfMedia));
    assert_eq!(synchronizer.single_mode_stop_at(), Some(8.0));

    synchronizer.on_position_advance(7.9, Some(8.0));
    synchronizer.on_position_advance(8.0, Some(8.0));

    assert_eq!(synchronizer.transport().pause_count(), 0);
    assert_eq!(synchronizer.stop_boundary(), Some(StopBoundary::EndOfMedia));
}

#[test]
fn test_singleModeStopAt_onLastLineWithoutDuration_shouldBeUnknown() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(2).expect("valid line");

    assert_eq!(synchronizer.single_mode_stop_at(), None);

    synchronizer.on_position_advance(5.2, Some(9.5));
    assert_eq!(synchronizer.single_mode_stop_at(), Some(9.5));
}

#[test]
fn test_setMode_toContinuous_shouldClearBoundary() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(0).expect("valid line");
    synchronizer.transport_mut().clear();

    assert_eq!(synchronizer.toggle_mode(), PlaybackMode::Continuous);
    assert!(synchronizer.stop_boundary().is_none());

    synchronizer.on_position_advance(3.5, None);
    assert_eq!(synchronizer.transport().pause_count(), 0);
    assert_eq!(synchronizer.active_line_index(), Some(1));
}

#[test]
fn test_setMode_toSingle_shouldNotInventBoundary() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Continuous);
    synchronizer.jump_to_line(0).expect("valid line");
    synchronizer.set_mode(PlaybackMode::Single);

    assert!(synchronizer.stop_boundary().is_none());
}

#[test]
fn test_onPause_shouldClearBoundaryAndKeepHighlight() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(1).expect("valid line");
    synchronizer.on_position_advance(3.2, None);

    synchronizer.on_pause();

    assert!(synchronizer.stop_boundary().is_none());
    assert_eq!(synchronizer.active_line_index(), Some(1));

    // Resuming without a jump plays on past the old boundary
    synchronizer.transport_mut().clear();
    synchronizer.on_position_advance(5.1, None);
    assert_eq!(synchronizer.transport().pause_count(), 0);
}

#[test]
fn test_onMediaEnded_inContinuousMode_shouldPlayNextLine() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Continuous);
    synchronizer.on_position_advance(3.5, None);
    synchronizer.transport_mut().clear();

    synchronizer.on_media_ended();

    assert_eq!(
        synchronizer.transport().commands,
        vec![TransportCommand::Seek(5.0), TransportCommand::Play]
    );
}

#[test]
fn test_onMediaEnded_atLastLine_shouldDoNothing() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Continuous);
    synchronizer.on_position_advance(6.0, None);
    synchronizer.transport_mut().clear();

    synchronizer.on_media_ended();

    assert!(synchronizer.transport().commands.is_empty());
}

#[test]
fn test_onMediaEnded_withoutHighlight_shouldStartFromFirstLine() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Continuous);
    synchronizer.on_media_ended();

    assert_eq!(synchronizer.transport().seeks(), vec![1.0]);
}

#[test]
fn test_onMediaEnded_inSingleMode_shouldDoNothing() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.on_position_advance(3.5, None);
    synchronizer.transport_mut().clear();

    synchronizer.on_media_ended();

    assert!(synchronizer.transport().commands.is_empty());
}

#[test]
fn test_setPlaybackRate_shouldForwardValidRatesOnly() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);

    synchronizer.set_playback_rate(1.5);
    synchronizer.set_playback_rate(-1.0);
    synchronizer.set_playback_rate(f64::NAN);

    assert_eq!(synchronizer.transport().commands, vec![TransportCommand::SetPlaybackRate(1.5)]);
    assert_eq!(synchronizer.playback_rate(), 1.5);
}

#[test]
fn test_onMetadataLoaded_withUnusableDuration_shouldKeepPrevious() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.on_metadata_loaded(12.0);
    synchronizer.on_metadata_loaded(f64::NAN);
    synchronizer.on_metadata_loaded(0.0);

    assert_eq!(synchronizer.duration(), Some(12.0));
}

#[test]
fn test_reset_shouldKeepModeAndTranscript() {
    let mut synchronizer = loaded_synchronizer(SAMPLE_TRANSCRIPT, PlaybackMode::Single);
    synchronizer.jump_to_line(0).expect("valid line");
    synchronizer.on_position_advance(1.5, None);

    synchronizer.reset();

    assert_eq!(synchronizer.active_line_index(), None);
    assert!(synchronizer.stop_boundary().is_none());
    assert_eq!(synchronizer.mode(), PlaybackMode::Single);
    assert_eq!(synchronizer.transcript().len(), 3);
}

#[test]
fn test_playbackMode_parseAndDisplay_shouldRoundTripNames() {
    assert_eq!("continuous".parse::<PlaybackMode>().ok(), Some(PlaybackMode::Continuous));
    assert_eq!("SINGLE".parse::<PlaybackMode>().ok(), Some(PlaybackMode::Single));
    assert!("loop".parse::<PlaybackMode>().is_err());
    assert_eq!(PlaybackMode::Continuous.to_string(), "continuous");
    assert_eq!(PlaybackMode::default(), PlaybackMode::Single);
}
