use crate::{
    Chunk, RECORDING_FILE_NAME, RecorderError, RecorderEvent, RecordingState, StartOutcome,
    tests::support::Harness,
};

use std::sync::{Arc, atomic::Ordering};

use uuid::Uuid;

/// WHAT: Full happy path from start to save
/// WHY: The clip must be exactly the chunks in order, saved under the fixed name
#[test]
#[allow(clippy::unwrap_used)]
fn given_chunks_a_b_c_when_stopped_and_saved_then_concatenation_saved_as_recording_wav() {
    // Given: A recording session receiving three chunks
    let mut h = Harness::new();
    let outcome = h.controller.start().unwrap();
    assert!(matches!(outcome, StartOutcome::Started { discarded: None, .. }));
    h.feed(b"AAAA");
    h.feed(b"BB");
    h.feed(b"CCCCCC");

    // When: Stopping, finalizing and saving
    assert!(h.stop_and_finalize());
    let path = h.controller.save().unwrap();

    // Then: Result is A||B||C and one download named recording.wav was triggered
    assert_eq!(h.controller.state(), RecordingState::Stopped);
    assert_eq!(h.controller.result().unwrap().data(), b"AAAABBCCCCCC");
    assert_eq!(path.unwrap().to_str(), Some(RECORDING_FILE_NAME));
    let saved = h.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].file_name, "recording.wav");
    assert_eq!(saved[0].data, b"AAAABBCCCCCC");
}

/// WHAT: Result equals the ordered concatenation for any chunk sequence
/// WHY: Chunk order must never be rearranged or dropped
#[test]
#[allow(clippy::unwrap_used)]
fn given_many_chunks_when_stopped_then_result_preserves_arrival_order() {
    // Given: Fifty chunks of varying length
    let mut h = Harness::new();
    h.controller.start().unwrap();
    let mut expected = Vec::new();
    for i in 0..50u8 {
        let chunk = vec![i; (i as usize % 7) + 1];
        expected.extend_from_slice(&chunk);
        h.feed(&chunk);
    }

    // When: Stopping
    assert!(h.stop_and_finalize());

    // Then: Result matches byte for byte
    assert_eq!(h.controller.result().unwrap().data(), expected.as_slice());
}

/// WHAT: After stop the buffer is empty and state is Stopped
/// WHY: Assembly consumes the buffer exactly once
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_when_finalized_then_buffer_empty_and_state_stopped() {
    // Given: A session with buffered chunks
    let mut h = Harness::new();
    h.controller.start().unwrap();
    h.feed(b"1234");
    assert_eq!(h.controller.session().chunks().len(), 1);

    // When: Stopping
    h.stop_and_finalize();

    // Then: Buffer drained, clip present
    assert!(h.controller.session().chunks().is_empty());
    assert_eq!(h.controller.state(), RecordingState::Stopped);
    assert!(h.controller.result().is_some());
}

/// WHAT: State stays Recording until the recorder reports finalization
/// WHY: The clip must include chunks flushed during finalization
#[test]
#[allow(clippy::unwrap_used)]
fn given_recorder_tail_chunk_when_stopping_then_tail_included_in_result() {
    // Given: A recorder that flushes a final chunk when stopped
    let mut h = Harness::new();
    *h.hardware.tail.lock().unwrap() = Some(Chunk::new(b"TAIL".to_vec()));
    h.controller.start().unwrap();
    h.feed(b"HEAD");

    // When: Stop is requested but events are not yet processed
    assert!(h.controller.stop());

    // Then: Still Recording with stop disabled, clip not yet assembled
    assert_eq!(h.controller.state(), RecordingState::Recording);
    assert!(!h.controller.controls().stop);
    assert!(h.controller.result().is_none());

    // When: Events are processed
    assert!(h.pump());

    // Then: Tail chunk arrived before finalization
    assert_eq!(h.controller.result().unwrap().data(), b"HEADTAIL");
}

/// WHAT: Save without a clip triggers nothing
/// WHY: save() is a no-op unless Stopped
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_result_when_saving_then_no_download_triggered() {
    // Given: Idle and then Recording controllers
    let mut h = Harness::new();

    // When: Saving while Idle
    let idle = h.controller.save().unwrap();

    // Then: Nothing saved
    assert!(idle.is_none());

    // When: Saving while Recording
    h.controller.start().unwrap();
    h.feed(b"data");
    let recording = h.controller.save().unwrap();

    // Then: Still nothing saved
    assert!(recording.is_none());
    assert!(h.saved().is_empty());
}

/// WHAT: Save may be repeated while the clip persists
/// WHY: Each save is an independent download
#[test]
#[allow(clippy::unwrap_used)]
fn given_stopped_when_saving_twice_then_two_independent_saves() {
    // Given: A finished clip
    let mut h = Harness::new();
    h.controller.start().unwrap();
    h.feed(b"xy");
    h.stop_and_finalize();
    assert!(h.controller.has_unsaved_result());

    // When: Saving twice
    h.controller.save().unwrap();
    h.controller.save().unwrap();

    // Then: Two saves with identical content, clip still present
    let saved = h.saved();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0], saved[1]);
    assert_eq!(h.controller.session().save_count(), 2);
    assert!(!h.controller.has_unsaved_result());
    assert_eq!(h.controller.state(), RecordingState::Stopped);
}

/// WHAT: start() while Recording is ignored
/// WHY: An overlapping start must not reset or corrupt the buffer
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_when_start_called_then_ignored_and_buffer_intact() {
    // Given: A live session with one chunk
    let mut h = Harness::new();
    h.controller.start().unwrap();
    let session_id = h.controller.session().id();
    h.feed(b"keep");

    // When: Starting again
    let outcome = h.controller.start().unwrap();

    // Then: Ignored, same session, buffer unchanged, provider asked only once
    assert_eq!(outcome, StartOutcome::Ignored);
    assert_eq!(h.controller.session().id(), session_id);
    assert_eq!(h.controller.session().chunks(), &[Chunk::new(b"keep".to_vec())]);
    assert_eq!(h.hardware.requests.load(Ordering::SeqCst), 1);
}

/// WHAT: start() while Requesting is ignored
/// WHY: The request is pending; a second one would race the first
#[test]
#[allow(clippy::unwrap_used)]
fn given_requesting_when_start_called_then_ignored() {
    // Given: A request in flight
    let mut h = Harness::new();
    let (session_id, _) = h.controller.begin_request().unwrap();
    assert_eq!(h.controller.state(), RecordingState::Requesting);
    assert!(!h.controller.controls().start);

    // When: Starting again
    let outcome = h.controller.start().unwrap();

    // Then: Ignored and still requesting the same session
    assert_eq!(outcome, StartOutcome::Ignored);
    assert_eq!(h.controller.state(), RecordingState::Requesting);
    assert_eq!(h.controller.session().id(), session_id);
    assert_eq!(h.hardware.requests.load(Ordering::SeqCst), 0);
}

/// WHAT: Split start resolves only the current request
/// WHY: The provider runs on a later loop turn and the session may have moved on
#[test]
#[allow(clippy::unwrap_used)]
fn given_pending_request_when_resolving_then_only_current_session_reaches_provider() {
    // Given: A request in flight
    let mut h = Harness::new();
    let (session_id, _) = h.controller.begin_request().unwrap();

    // When: Resolving an unknown session
    h.controller.resolve_request(Uuid::new_v4()).unwrap();

    // Then: Provider untouched, still requesting
    assert_eq!(h.hardware.requests.load(Ordering::SeqCst), 0);
    assert_eq!(h.controller.state(), RecordingState::Requesting);

    // When: Resolving the current session
    h.controller.resolve_request(session_id).unwrap();

    // Then: Recording, and a repeat resolution is a no-op
    assert_eq!(h.controller.state(), RecordingState::Recording);
    h.controller.resolve_request(session_id).unwrap();
    assert_eq!(h.hardware.requests.load(Ordering::SeqCst), 1);
}

/// WHAT: Permission denial returns to Idle and a later start succeeds
/// WHY: Failure leaves no partial state and needs no cleanup
#[test]
#[allow(clippy::unwrap_used)]
fn given_permission_denied_when_starting_then_idle_and_retry_succeeds() {
    // Given: A provider that refuses capture
    let mut h = Harness::new();
    h.hardware.deny.store(true, Ordering::SeqCst);

    // When: Starting
    let result = h.controller.start();

    // Then: CaptureUnavailable, Idle, no buffer
    assert!(matches!(
        result,
        Err(RecorderError::CaptureUnavailable { .. })
    ));
    assert_eq!(h.controller.state(), RecordingState::Idle);
    assert!(h.controller.session().chunks().is_empty());
    assert!(h.controller.result().is_none());
    assert!(h.controller.controls().start);

    // When: Permission is granted and the user starts again
    h.hardware.deny.store(false, Ordering::SeqCst);
    let outcome = h.controller.start().unwrap();

    // Then: Recording
    assert!(matches!(outcome, StartOutcome::Started { .. }));
    assert_eq!(h.controller.state(), RecordingState::Recording);
    assert_eq!(h.hardware.requests.load(Ordering::SeqCst), 2);
}

/// WHAT: A granted stream that fails to start also returns to Idle
/// WHY: Every failure path ends in Idle
#[test]
fn given_recorder_start_failure_when_starting_then_idle() {
    // Given: A recorder that cannot start
    let mut h = Harness::new();
    h.hardware.fail_start.store(true, Ordering::SeqCst);

    // When: Starting
    let result = h.controller.start();

    // Then: DeviceError and Idle
    assert!(matches!(result, Err(RecorderError::DeviceError { .. })));
    assert_eq!(h.controller.state(), RecordingState::Idle);
}

/// WHAT: Starting after a finished clip discards it and reports the discard
/// WHY: The replacement of a session must be observable
#[test]
#[allow(clippy::unwrap_used, clippy::panic)]
fn given_stopped_when_starting_again_then_old_result_discarded_and_new_chunks_independent() {
    // Given: A finished, unsaved clip
    let mut h = Harness::new();
    h.controller.start().unwrap();
    let first_id = h.controller.session().id();
    h.feed(b"old-old");
    h.stop_and_finalize();

    // When: Starting a new session
    let outcome = h.controller.start().unwrap();

    // Then: The old clip is reported as discarded and unsaved
    let StartOutcome::Started {
        session_id,
        discarded,
    } = outcome
    else {
        panic!("expected Started, got {:?}", outcome);
    };
    let discarded = discarded.unwrap();
    assert_ne!(session_id, first_id);
    assert_eq!(discarded.session_id, first_id);
    assert_eq!(discarded.bytes, 7);
    assert!(!discarded.saved);
    assert!(h.controller.result().is_none());

    // When: The new session records and stops
    h.feed(b"new");
    h.stop_and_finalize();

    // Then: Only the new chunks are in the clip
    assert_eq!(h.controller.result().unwrap().data(), b"new");
}

/// WHAT: A failed start from Stopped still discards the old clip
/// WHY: result exists only while Stopped; failure lands in Idle
#[test]
#[allow(clippy::unwrap_used)]
fn given_stopped_when_restart_denied_then_idle_without_result() {
    // Given: A finished clip
    let mut h = Harness::new();
    h.controller.start().unwrap();
    h.feed(b"abc");
    h.stop_and_finalize();

    // When: The next request is denied
    h.hardware.deny.store(true, Ordering::SeqCst);
    let result = h.controller.start();

    // Then: Idle, no clip, save disabled
    assert!(result.is_err());
    assert_eq!(h.controller.state(), RecordingState::Idle);
    assert!(h.controller.result().is_none());
    assert!(!h.controller.controls().save);
}

/// WHAT: stop() outside Recording does nothing
/// WHY: Invalid calls are ignored rather than failing
#[test]
#[allow(clippy::unwrap_used)]
fn given_not_recording_when_stopping_then_noop() {
    // Given: An idle controller
    let mut h = Harness::new();

    // When/Then: Stop is ignored
    assert!(!h.controller.stop());
    assert_eq!(h.controller.state(), RecordingState::Idle);

    // Given: A finished clip
    h.controller.start().unwrap();
    h.stop_and_finalize();

    // When/Then: A second stop is ignored and the recorder is not stopped again
    assert!(!h.controller.stop());
    assert_eq!(h.hardware.stops.load(Ordering::SeqCst), 1);
    assert_eq!(h.controller.state(), RecordingState::Stopped);
}

/// WHAT: Events tagged with another session are dropped
/// WHY: A superseded recorder must not leak audio into the new clip
#[test]
#[allow(clippy::unwrap_used)]
fn given_stale_session_events_when_recording_then_ignored() {
    // Given: A live session
    let mut h = Harness::new();
    h.controller.start().unwrap();
    let stranger = Uuid::new_v4();

    // When: Chunk and finalization arrive for another session
    h.controller
        .on_event(RecorderEvent::chunk(stranger, b"ghost".as_slice()));
    let completed = h.controller.on_event(RecorderEvent::finalized(stranger));

    // Then: Nothing changed
    assert!(!completed);
    assert!(h.controller.session().chunks().is_empty());
    assert_eq!(h.controller.state(), RecordingState::Recording);
}

/// WHAT: Chunks outside Recording are ignored
/// WHY: onChunk is only valid while Recording
#[test]
fn given_idle_when_chunk_arrives_then_ignored() {
    // Given: An idle controller
    let mut h = Harness::new();

    // When: A chunk for the current session id arrives
    h.feed(b"early");

    // Then: Nothing is buffered
    assert!(h.controller.session().chunks().is_empty());
    assert_eq!(h.controller.state(), RecordingState::Idle);
}

/// WHAT: A stream failure finalizes with the audio captured so far
/// WHY: Losing the device should not lose the recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_stream_failure_when_recording_then_finalized_with_captured_audio() {
    // Given: A live session with data
    let mut h = Harness::new();
    h.controller.start().unwrap();
    h.feed(b"saved-so-far");
    let session_id = h.controller.session().id();

    // When: The stream reports a failure and events are processed
    h.controller
        .on_event(RecorderEvent::failed(session_id, "device unplugged"));
    let completed = h.pump();

    // Then: Clip assembled from what was captured
    assert!(completed);
    assert_eq!(h.controller.state(), RecordingState::Stopped);
    assert_eq!(h.controller.result().unwrap().data(), b"saved-so-far");
}

/// WHAT: A late resolution for a superseded request is dropped
/// WHY: Continuations may arrive after the session changed
#[test]
#[allow(clippy::unwrap_used)]
fn given_stale_request_resolution_when_completing_then_dropped() {
    // Given: A live session
    let mut h = Harness::new();
    h.controller.start().unwrap();
    let session_id = h.controller.session().id();

    // When: A failure resolution arrives for an unknown session
    let result = h.controller.complete_request(
        Uuid::new_v4(),
        Err(RecorderError::CaptureUnavailable {
            reason: "late".to_string(),
            location: error_location::ErrorLocation::from(std::panic::Location::caller()),
        }),
    );

    // Then: Ignored, session unaffected
    assert!(result.is_ok());
    assert_eq!(h.controller.session().id(), session_id);
    assert_eq!(h.controller.state(), RecordingState::Recording);
}

/// WHAT: Controls follow the state machine
/// WHY: Front ends disable actions from this
#[test]
#[allow(clippy::unwrap_used)]
fn given_each_state_when_reading_controls_then_matches_lifecycle() {
    let mut h = Harness::new();

    // Idle: only start
    let c = h.controller.controls();
    assert!(c.start && !c.stop && !c.save && !c.play);

    // Recording: only stop
    h.controller.start().unwrap();
    let c = h.controller.controls();
    assert!(!c.start && c.stop && !c.save && !c.play);

    // Stopped: start, save, play
    h.stop_and_finalize();
    let c = h.controller.controls();
    assert!(c.start && !c.stop && c.save && c.play);
}

/// WHAT: Playback source is created once per clip and released on restart
/// WHY: The derived reference must not be recreated or leaked
#[test]
#[allow(clippy::unwrap_used)]
fn given_stopped_when_requesting_playback_then_cached_until_new_session() {
    // Given: A finished clip of two stereo frames
    let mut h = Harness::new();
    h.controller.start().unwrap();
    h.feed(&[0, 0, 0, 0, 0xff, 0x7f, 0x01, 0x80]);
    h.stop_and_finalize();

    // When: Asking for the playback source twice
    let first = h.controller.playback_source().unwrap();
    let second = h.controller.playback_source().unwrap();

    // Then: Same shared source, decoded correctly
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.frames(), 2);
    assert!((first.samples()[2] - 1.0).abs() < f32::EPSILON);
    assert!((first.samples()[3] + 1.0).abs() < f32::EPSILON);
    drop(second);
    assert_eq!(Arc::strong_count(&first), 2);

    // When: A new session starts
    h.controller.start().unwrap();

    // Then: The controller released its reference and has none to offer
    assert_eq!(Arc::strong_count(&first), 1);
    assert!(h.controller.playback_source().is_none());
}
