//! The headless demo application.
//!
//! Owns one tracking session and one placement state machine and runs the
//! per-frame loop between them: advance the world, hand session events to
//! the state machine, play due user actions, then poll visibility and tick.

use std::time::Duration;

use placemat_core::{DebugOverlay, PlacementState, SessionEvent};
use placemat_session::{Session, SessionConfig, SimulatedBackend, ViewPoint};

use crate::scenario::{Scenario, UserAction, UserStep};
use crate::DemoConfig;

/// The demo application: one session, one placement state, one loop.
pub struct PlacementApp {
    session: Session,
    placement: PlacementState,
    user_steps: Vec<UserStep>,
    next_user: usize,
    frame: u64,
    frame_time: Duration,
    last_status: String,
    last_overlay: DebugOverlay,
}

impl PlacementApp {
    /// Build the app from a configuration and scenario and start the
    /// tracking session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot start, including on
    /// platforms without world tracking.
    pub fn new(config: &DemoConfig, scenario: Scenario) -> anyhow::Result<Self> {
        let supported = scenario.tracking_supported;
        let (script, user_steps) = scenario.split();
        let backend = if supported {
            SimulatedBackend::new(script)
        } else {
            SimulatedBackend::unsupported()
        };
        let mut session = Session::new(Box::new(backend), SessionConfig::default());
        session.start()?;

        let overlay = DebugOverlay::startup();
        tracing::debug!("Debug overlay: {overlay:?}");

        let frame_time = Duration::from_secs_f64(1.0 / f64::from(config.fps.max(1)));
        Ok(Self {
            session,
            placement: PlacementState::new(),
            user_steps,
            next_user: 0,
            frame: 0,
            frame_time,
            last_status: String::new(),
            last_overlay: overlay,
        })
    }

    /// Run one frame: advance the world, dispatch session events, apply
    /// due user actions, then poll visibility and tick the state machine.
    pub fn run_frame(&mut self) {
        self.frame += 1;
        self.session.update(self.frame_time);

        for event in self.session.poll_events() {
            self.dispatch(event);
        }

        while let Some(step) = self.user_steps.get(self.next_user) {
            if step.at_frame > self.frame {
                break;
            }
            let action = step.action;
            self.next_user += 1;
            self.apply_user_action(action);
        }

        let visible = self.session.surface_in_view();
        self.placement.on_frame_tick(visible);
        self.placement.advance(self.frame_time);

        self.publish_status();
    }

    /// Run `frames` frames as fast as possible.
    pub fn run(&mut self, frames: u64) {
        while self.frame < frames {
            self.run_frame();
        }
    }

    /// Run `frames` frames paced to the configured frame rate, stopping
    /// early on Ctrl-C.
    pub async fn run_paced(&mut self, frames: u64) {
        let mut ticker = tokio::time::interval(self.frame_time);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        while self.frame < frames {
            tokio::select! {
                _ = ticker.tick() => self.run_frame(),
                _ = &mut ctrl_c => {
                    tracing::info!("Interrupt received, stopping after frame {}", self.frame);
                    break;
                }
            }
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AnchorAdded(anchor) => self.placement.on_surface_detected(&anchor),
            SessionEvent::TrackingChanged(quality) => {
                self.placement.on_tracking_quality_changed(&quality);
            }
            SessionEvent::Interrupted => self.placement.on_session_interrupted(),
            SessionEvent::InterruptionEnded => {
                let options = self.placement.on_session_interruption_ended();
                if let Err(err) = self.session.restart(options) {
                    tracing::error!("Failed to restart the session: {err}");
                    self.placement.on_session_failed(&err.to_string());
                }
            }
            SessionEvent::Failed { message } => self.placement.on_session_failed(&message),
        }
    }

    fn apply_user_action(&mut self, action: UserAction) {
        match action {
            UserAction::Tap { x, y } => {
                if let Some(hit) = self.session.hit_test(ViewPoint::new(x, y)) {
                    self.placement.on_placement_tap(&hit);
                } else {
                    tracing::debug!("Tap at ({x}, {y}) hit no surface");
                }
            }
            UserAction::SpinSphere { axis } => self.placement.spin_sphere(axis),
        }
    }

    fn publish_status(&mut self) {
        let status = self.placement.status_text();
        if status != self.last_status {
            tracing::info!("Status: {status}");
            self.last_status = status.to_string();
        }
        let overlay = self.placement.debug_overlay();
        if overlay != self.last_overlay {
            tracing::debug!("Debug overlay: {overlay:?}");
            self.last_overlay = overlay;
        }
    }

    /// The placement state after the frames run so far.
    #[must_use]
    pub fn placement(&self) -> &PlacementState {
        &self.placement
    }

    /// The tracking session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Frames run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The scene graph serialized to JSON, for `--dump-scene`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn scene_json(&self) -> anyhow::Result<String> {
        Ok(self.placement.scene().to_json()?)
    }
}
