//! Simulated Session Integration Tests
//!
//! Tests the session boundary end to end:
//! - Scripted detection feeding the visibility scan
//! - Hit testing against plane coverage
//! - Lifecycle (pause, restart) and interruption recovery
//! - Event handover from a backend thread to the polling context

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use placemat_core::{
    RestartOptions, SessionEvent, SurfaceAlignment, SurfaceHit, TrackingLimitation,
    TrackingQuality, Vec3,
};
use placemat_session::{
    CoverageRect, Session, SessionConfig, SessionResult, SimScript, SimStep, SimulatedBackend,
    TrackingBackend, ViewPoint, WorldStep,
};

/// A floor plane filling the lower half of the view.
fn floor_plane(at_frame: u64) -> SimStep {
    SimStep {
        at_frame,
        step: WorldStep::AddPlane {
            center: Vec3::new(0.0, -0.4, -1.0),
            extent_x: 1.2,
            extent_z: 0.8,
            alignment: SurfaceAlignment::Horizontal,
            coverage: CoverageRect::new(0.0, 0.5, 1.0, 1.0),
        },
    }
}

fn session_with(script: SimScript) -> Session {
    let backend = Box::new(SimulatedBackend::new(script));
    let mut session = Session::new(backend, SessionConfig::default());
    session.start().expect("session starts");
    session
}

fn run_frames(session: &mut Session, frames: u64) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for _ in 0..frames {
        session.update(Duration::from_millis(16));
        events.extend(session.poll_events());
    }
    events
}

// ============================================================================
// Detection and Visibility
// ============================================================================

#[test]
fn test_detection_turns_the_visibility_scan_on() {
    let mut session = session_with(SimScript::new(vec![floor_plane(2)]));

    assert!(!session.surface_in_view());
    let events = run_frames(&mut session, 1);
    assert!(events.is_empty());
    assert!(!session.surface_in_view());

    let events = run_frames(&mut session, 1);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SessionEvent::AnchorAdded(_)));
    assert!(session.surface_in_view());
}

#[test]
fn test_looking_away_hides_the_surface() {
    let script = SimScript::new(vec![
        floor_plane(1),
        SimStep {
            at_frame: 3,
            step: WorldStep::SetCoverage {
                plane: 0,
                coverage: None,
            },
        },
        SimStep {
            at_frame: 5,
            step: WorldStep::SetCoverage {
                plane: 0,
                coverage: Some(CoverageRect::new(0.0, 0.5, 1.0, 1.0)),
            },
        },
    ]);
    let mut session = session_with(script);

    run_frames(&mut session, 1);
    assert!(session.surface_in_view());

    run_frames(&mut session, 2);
    assert!(!session.surface_in_view());

    run_frames(&mut session, 2);
    assert!(session.surface_in_view());
}

#[test]
fn test_taps_only_land_inside_coverage() {
    let mut session = session_with(SimScript::new(vec![floor_plane(1)]));
    run_frames(&mut session, 1);

    let hit = session
        .hit_test(ViewPoint::new(0.5, 0.75))
        .expect("lower half is covered");
    assert!((hit.world_position.y + 0.4).abs() < 1e-6);

    assert!(session.hit_test(ViewPoint::new(0.5, 0.25)).is_none());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_pause_freezes_and_restart_resumes() {
    let script = SimScript::new(vec![SimStep {
        at_frame: 2,
        step: WorldStep::SetTracking {
            quality: TrackingQuality::Normal,
        },
    }]);
    let mut session = session_with(script);

    run_frames(&mut session, 1);
    session.pause();
    assert!(!session.is_running());

    let events = run_frames(&mut session, 5);
    assert!(events.is_empty());
    assert_eq!(session.stats().frames, 1);

    let resume = RestartOptions {
        reset_tracking: false,
        remove_existing_anchors: false,
    };
    session.restart(resume).expect("restart succeeds");
    assert!(session.is_running());

    let events = run_frames(&mut session, 1);
    assert_eq!(
        events,
        vec![SessionEvent::TrackingChanged(TrackingQuality::Normal)]
    );
}

#[test]
fn test_interruption_and_recovery_full_cycle() {
    let script = SimScript::new(vec![
        floor_plane(1),
        SimStep {
            at_frame: 3,
            step: WorldStep::Interrupt,
        },
        SimStep {
            at_frame: 5,
            step: WorldStep::EndInterruption,
        },
    ]);
    let mut session = session_with(script);

    let events = run_frames(&mut session, 2);
    let SessionEvent::AnchorAdded(original) = &events[0] else {
        panic!("expected an anchor event, got {events:?}");
    };
    let original_id = original.id;
    assert!(session.surface_in_view());

    let events = run_frames(&mut session, 2);
    assert_eq!(events, vec![SessionEvent::Interrupted]);
    assert!(!session.surface_in_view());

    let events = run_frames(&mut session, 1);
    assert_eq!(events, vec![SessionEvent::InterruptionEnded]);

    session
        .restart(RestartOptions::reset_all())
        .expect("restart succeeds");
    // Anchors are gone until the simulator re-detects the plane.
    assert!(!session.surface_in_view());

    let events = run_frames(&mut session, 40);
    let mut saw_initializing = false;
    let mut saw_normal = false;
    let mut redetected = None;
    for event in events {
        match event {
            SessionEvent::TrackingChanged(TrackingQuality::Limited(
                TrackingLimitation::Initializing,
            )) => saw_initializing = true,
            SessionEvent::TrackingChanged(TrackingQuality::Normal) => saw_normal = true,
            SessionEvent::AnchorAdded(anchor) => redetected = Some(anchor),
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(saw_initializing);
    assert!(saw_normal);
    let redetected = redetected.expect("plane redetected");
    assert_ne!(redetected.id, original_id);
    assert!(session.surface_in_view());
}

#[test]
fn test_stats_accumulate_per_update() {
    let mut session = session_with(SimScript::default());
    run_frames(&mut session, 10);

    let stats = session.stats();
    assert_eq!(stats.frames, 10);
    assert!((stats.avg_frame_time_ms - 16.0).abs() < 0.5);
    assert!((stats.peak_frame_time_ms - 16.0).abs() < 0.5);
}

// ============================================================================
// Event Handover
// ============================================================================

/// Backend whose events arrive from another thread, the way platform
/// runtimes deliver callbacks.
struct ThreadedBackend {
    queue: Arc<Mutex<VecDeque<SessionEvent>>>,
}

impl TrackingBackend for ThreadedBackend {
    fn is_supported(&self) -> bool {
        true
    }
    fn start(&mut self, _config: &SessionConfig) -> SessionResult<()> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn restart(&mut self, _config: &SessionConfig, _options: RestartOptions) -> SessionResult<()> {
        Ok(())
    }
    fn update(&mut self, _dt: Duration) {}
    fn poll_events(&mut self) -> Vec<SessionEvent> {
        let mut queue = self.queue.lock().expect("queue lock");
        queue.drain(..).collect()
    }
    fn hit_test(&self, _point: ViewPoint) -> Option<SurfaceHit> {
        None
    }
}

#[test]
fn test_events_from_a_backend_thread_arrive_in_order() {
    let queue = Arc::new(Mutex::new(VecDeque::new()));
    let backend = Box::new(ThreadedBackend {
        queue: Arc::clone(&queue),
    });
    let mut session = Session::new(backend, SessionConfig::default());
    session.start().expect("session starts");

    let producer = Arc::clone(&queue);
    let handle = std::thread::spawn(move || {
        for i in 0..10_u32 {
            let mut pending = producer.lock().expect("queue lock");
            pending.push_back(SessionEvent::TrackingChanged(TrackingQuality::Limited(
                TrackingLimitation::Other(format!("report-{i}")),
            )));
        }
    });
    handle.join().expect("producer finishes");

    session.update(Duration::from_millis(16));
    let events = session.poll_events();
    assert_eq!(events.len(), 10);
    for (i, event) in events.iter().enumerate() {
        let SessionEvent::TrackingChanged(TrackingQuality::Limited(TrackingLimitation::Other(
            report,
        ))) = event
        else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(report, &format!("report-{i}"));
    }
    assert!(session.poll_events().is_empty());
}
