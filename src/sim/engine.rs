//! Game controller
//!
//! `GameEngine` owns the whole run: clock, registry, score and activation
//! policy. The host forwards UI events and the passage of time; the engine
//! answers through a `Presenter`.
//!
//! Every timer callback and every click re-checks the current state before it
//! does anything. A timer that fires after the world moved on is a no-op.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::activation::{self, ActivationPolicy};
use super::clock::{Millis, Scheduler, TimerHandle};
use super::motion;
use super::object::{GameObject, Lifecycle, ObjectId, ObjectKind, Position};
use super::registry::ObjectRegistry;
use super::scoring::{Outcome, ScoringPolicy};
use crate::config::{DifficultyPreset, GameConfig, GameKind, Variant};
use crate::view::{Presenter, Removal, Tone};

/// Seed used when the configuration does not pin one
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;

/// Run state of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// Payload of every engine timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Next activation decision (spawn / growth / tile activation)
    Decide,
    /// Active time ran out
    Expire(ObjectId),
    /// Grace window closed
    GraceExpire(ObjectId),
}

mod status {
    pub const READY: &str = "Click red, avoid blue!";
    pub const STARTED: &str = "Game on! Tap reds, dodge blues.";
    pub const PAUSED: &str = "Paused. Press resume when ready.";
    pub const RESUMED: &str = "Back in the action!";
    pub const RED_HIT: &str = "Nice! You caught the red.";
    pub const BLUE_HIT: &str = "Oops! Avoid the blue.";
    pub const IDLE_CLICK: &str = "Careful! That one wasn't active.";
    pub const BLUE_AVOIDED: &str = "Good job avoiding blue.";
    pub const RED_MISSED: &str = "Missed a red!";
}

/// One game instance
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: GameConfig,
    run_state: RunState,
    clock: Scheduler<TimerEvent>,
    registry: ObjectRegistry,
    scoring: ScoringPolicy,
    activation: ActivationPolicy,
    rng: Pcg32,
    /// The single pending activation decision
    decision: Option<TimerHandle>,
    /// Timestamp of the previous animation frame (ms)
    last_frame: Option<f64>,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        Self {
            run_state: RunState::Stopped,
            clock: Scheduler::new(),
            registry: ObjectRegistry::new(),
            scoring: ScoringPolicy::new(config.scoring),
            activation: ActivationPolicy::new(config.variant, config.preset),
            rng: Pcg32::seed_from_u64(seed),
            decision: None,
            last_frame: None,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn kind(&self) -> GameKind {
        self.config.kind()
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn score(&self) -> i64 {
        self.scoring.score()
    }

    /// Current difficulty stage (high-water mark for this run)
    pub fn stage(&self) -> u32 {
        self.activation.stage()
    }

    /// Activations so far this run
    pub fn rounds(&self) -> u32 {
        self.activation.rounds()
    }

    pub fn preset(&self) -> DifficultyPreset {
        self.activation.preset()
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Engine clock (ms)
    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    /// Outstanding timers of any kind
    pub fn pending_timers(&self) -> usize {
        self.clock.pending()
    }

    /// Whether an activation decision is armed
    pub fn decision_pending(&self) -> bool {
        self.decision.is_some_and(|h| self.clock.is_pending(h))
    }

    // === Lifecycle ===

    /// Stopped -> Running. Fresh score, progress and registry.
    pub fn start(&mut self, view: &mut impl Presenter) {
        if self.run_state != RunState::Stopped {
            log::debug!("start ignored while {:?}", self.run_state);
            return;
        }
        self.cancel_decision();
        self.clear_objects(view);
        self.scoring.reset();
        self.activation.reset();
        self.last_frame = None;
        view.update_score_display(self.scoring.score(), 0);

        self.run_state = RunState::Running;
        view.set_run_state(self.run_state);
        self.status(view, status::STARTED, Tone::Neutral);

        if let Variant::Bounce(t) = self.config.variant {
            for _ in 0..t.initial_balls.min(t.max_balls) {
                self.spawn_ball(view);
            }
        }
        self.arm_decision(None);
        log::info!("{} started", self.kind().title());
    }

    /// Running -> Paused. Objects stay put but every timer is cancelled.
    pub fn pause(&mut self, view: &mut impl Presenter) {
        if self.run_state != RunState::Running {
            return;
        }
        self.run_state = RunState::Paused;
        self.cancel_decision();
        self.registry.disarm_all(&mut self.clock);
        self.last_frame = None;
        view.set_run_state(self.run_state);
        self.status(view, status::PAUSED, Tone::Neutral);
        log::info!("Paused with {} objects live", self.registry.len());
    }

    /// Paused -> Running. Survivors get a full fresh timer.
    pub fn resume(&mut self, view: &mut impl Presenter) {
        if self.run_state != RunState::Paused {
            return;
        }
        self.run_state = RunState::Running;

        let active = self.activation.active_duration();
        let grace = self.activation.grace_duration();
        for id in self.registry.ids() {
            let Some(state) = self.registry.get(id).map(|o| o.state()) else {
                continue;
            };
            match (state, active, grace) {
                (Lifecycle::Active, Some(delay), _) => {
                    self.registry.arm(id, &mut self.clock, delay, TimerEvent::Expire(id));
                }
                (Lifecycle::Grace, _, Some(delay)) => {
                    self.registry.arm(id, &mut self.clock, delay, TimerEvent::GraceExpire(id));
                }
                _ => {}
            }
        }
        self.last_frame = None;
        self.arm_decision(None);
        view.set_run_state(self.run_state);
        self.status(view, status::RESUMED, Tone::Positive);
        log::info!("Resumed");
    }

    pub fn toggle_pause(&mut self, view: &mut impl Presenter) {
        match self.run_state {
            RunState::Running => self.pause(view),
            RunState::Paused => self.resume(view),
            RunState::Stopped => {}
        }
    }

    /// Any -> Stopped. Nothing survives: no objects, no timers, score zero.
    pub fn reset(&mut self, view: &mut impl Presenter) {
        self.run_state = RunState::Stopped;
        self.cancel_decision();
        self.clear_objects(view);
        self.clock.cancel_all();
        self.scoring.reset();
        self.activation.reset();
        self.last_frame = None;
        view.update_score_display(self.scoring.score(), 0);
        view.set_run_state(self.run_state);
        self.status(view, status::READY, Tone::Neutral);
        log::info!("{} reset", self.kind().title());
    }

    /// Page hidden: pause if running. Never resumes on its own.
    pub fn on_visibility_hidden(&mut self, view: &mut impl Presenter) {
        if self.run_state == RunState::Running {
            log::info!("Auto-paused (page hidden)");
            self.pause(view);
        }
    }

    /// Switch the difficulty preset. While a run is live every activation is
    /// cleared and the decision timer re-armed under the new preset.
    pub fn on_difficulty_changed(&mut self, preset: DifficultyPreset, view: &mut impl Presenter) {
        if self.activation.preset() == preset {
            return;
        }
        self.activation.set_preset(preset);
        self.config.preset = preset;
        log::info!("Difficulty set to {}", preset.label());
        if self.kind() != GameKind::Tiles {
            // Presets only pace the tile game
            return;
        }

        if self.run_state != RunState::Stopped {
            self.cancel_decision();
            if self.kind() == GameKind::Tiles {
                self.clear_objects(view);
            }
        }
        if self.run_state == RunState::Running {
            self.arm_decision(None);
            self.status(view, &format!("{} mode engaged!", preset.label()), Tone::Neutral);
        } else {
            // Paused runs pick up the new preset on resume
            self.status(view, &format!("{} difficulty selected.", preset.label()), Tone::Neutral);
        }
    }

    /// Playfield resized: keep every object inside the new bounds
    pub fn on_resize(&mut self, view: &mut impl Presenter) {
        let bounds = view.playfield_bounds();
        match self.config.variant {
            Variant::Balloon(_) => {
                let size = activation::balloon_size(bounds);
                for object in self.registry.iter_mut() {
                    let pos = activation::random_point(&mut self.rng, bounds, size);
                    object.size = size;
                    object.position = Position::Point(pos);
                    view.move_object_visual(object.id, object.position);
                }
            }
            Variant::Bounce(_) => {
                for object in self.registry.iter_mut() {
                    if let Position::Point(pos) = object.position {
                        object.position = Position::Point(bounds.clamp(pos, object.size));
                        view.move_object_visual(object.id, object.position);
                    }
                }
            }
            Variant::Tiles(_) => {}
        }
    }

    // === Interaction ===

    /// The player clicked an object
    pub fn on_object_interacted(&mut self, id: ObjectId, view: &mut impl Presenter) {
        if self.run_state != RunState::Running {
            return;
        }
        let Some(object) = self.registry.get(id) else {
            log::trace!("click on stale object {}", id);
            return;
        };
        if !object.state().is_live() {
            return;
        }
        let outcome = match object.kind {
            ObjectKind::Blue => Outcome::TrapHit,
            _ => Outcome::Hit,
        };
        let kind = object.kind;

        self.resolve(id, outcome, view);
        match kind {
            ObjectKind::Red => self.status(view, status::RED_HIT, Tone::Positive),
            ObjectKind::Blue => self.status(view, status::BLUE_HIT, Tone::Negative),
            _ => {}
        }

        match self.config.variant {
            Variant::Balloon(_) => {}
            Variant::Bounce(t) => self.arm_decision(Some(t.refill_delay_ms)),
            Variant::Tiles(_) => self.arm_decision(None),
        }
    }

    /// The player clicked a grid cell (tile game)
    pub fn on_cell_interacted(&mut self, cell: usize, view: &mut impl Presenter) {
        let Variant::Tiles(t) = self.config.variant else {
            return;
        };
        if self.run_state != RunState::Running || cell >= t.cell_count() {
            return;
        }
        if let Some(id) = self.registry.in_cell(cell) {
            self.on_object_interacted(id, view);
            return;
        }
        self.apply_outcome(Outcome::IdleClick, view);
        self.status(view, status::IDLE_CLICK, Tone::Negative);
    }

    // === Time ===

    /// Fire every timer due at or before `now`
    pub fn advance(&mut self, now: Millis, view: &mut impl Presenter) {
        while let Some((handle, event)) = self.clock.pop_due(now) {
            self.dispatch(handle, event, view);
        }
    }

    /// Animation heartbeat: integrate moving objects by the real time elapsed
    /// since the previous frame. The first frame after start/resume only sets
    /// the baseline.
    pub fn frame(&mut self, timestamp_ms: f64, view: &mut impl Presenter) {
        if self.run_state != RunState::Running {
            return;
        }
        let dt = match self.last_frame {
            Some(last) => ((timestamp_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame = Some(timestamp_ms);

        let bounds = view.playfield_bounds();
        for object in self.registry.iter_mut() {
            let (Position::Point(mut pos), Some(mut vel)) = (object.position, object.velocity) else {
                continue;
            };
            motion::integrate(&mut pos, &mut vel, object.size, bounds, dt);
            object.position = Position::Point(pos);
            object.velocity = Some(vel);
            view.move_object_visual(object.id, object.position);
        }
    }

    fn dispatch(&mut self, handle: TimerHandle, event: TimerEvent, view: &mut impl Presenter) {
        if self.run_state != RunState::Running {
            log::trace!("{:?} fired while {:?}; ignored", event, self.run_state);
            return;
        }
        match event {
            TimerEvent::Decide => {
                if self.decision != Some(handle) {
                    log::trace!("stale decision timer");
                    return;
                }
                self.decision = None;
                self.decide(view);
            }
            TimerEvent::Expire(id) => {
                if !self.registry.is_current(id, handle, Lifecycle::Active) {
                    log::trace!("stale expiry for {}", id);
                    return;
                }
                self.expire(id, view);
            }
            TimerEvent::GraceExpire(id) => {
                if !self.registry.is_current(id, handle, Lifecycle::Grace) {
                    log::trace!("stale grace expiry for {}", id);
                    return;
                }
                self.resolve(id, Outcome::Miss, view);
                self.status(view, status::RED_MISSED, Tone::Negative);
                self.arm_decision(None);
            }
        }
    }

    /// One activation decision
    fn decide(&mut self, view: &mut impl Presenter) {
        match self.config.variant {
            Variant::Balloon(_) => {
                self.spawn_balloon(view);
                self.arm_decision(None);
            }
            Variant::Bounce(_) => {
                if self.activation.has_capacity(self.registry.len()) {
                    self.spawn_ball(view);
                }
                self.arm_decision(None);
            }
            Variant::Tiles(t) => {
                if self.activation.has_capacity(self.registry.active_count()) {
                    let registry = &self.registry;
                    let cell = activation::pick_idle_cell(&mut self.rng, t.cell_count(), |c| {
                        registry.in_cell(c).is_some()
                    });
                    if let Some(cell) = cell {
                        let kind = activation::pick_tile_kind(&mut self.rng, t.blue_chance);
                        self.activate(GameObject::new(kind, Position::Cell(cell)), view);
                    } else {
                        log::trace!("no idle cell; skipping activation");
                    }
                } else {
                    log::trace!("concurrency cap reached; skipping activation");
                }
                self.arm_decision(None);
            }
        }
    }

    /// Active time ran out
    fn expire(&mut self, id: ObjectId, view: &mut impl Presenter) {
        let Some(kind) = self.registry.get(id).map(|o| o.kind) else {
            return;
        };
        if kind.has_grace() {
            if let Some(grace) = self.activation.grace_duration() {
                self.registry
                    .begin_grace(id, &mut self.clock, grace, TimerEvent::GraceExpire(id));
                log::debug!("{} entered grace", id);
                self.arm_decision(None);
                return;
            }
        }
        if kind.is_trap() {
            self.resolve(id, Outcome::TrapAvoided, view);
            self.status(view, status::BLUE_AVOIDED, Tone::Positive);
            self.arm_decision(None);
        } else {
            self.resolve(id, Outcome::Miss, view);
            if self.kind() == GameKind::Tiles {
                self.status(view, status::RED_MISSED, Tone::Negative);
                self.arm_decision(None);
            }
        }
    }

    /// Register, time and draw a fresh object
    fn activate(&mut self, object: GameObject, view: &mut impl Presenter) -> ObjectId {
        let kind = object.kind;
        let position = object.position;
        let id = self.registry.add(object);
        self.activation.record_activation();
        if let Some(delay) = self.activation.active_duration() {
            self.registry.arm(id, &mut self.clock, delay, TimerEvent::Expire(id));
        }
        view.render_object_at(id, kind, position);
        log::debug!("Activated {} {} at {:?}", kind.as_str(), id, position);
        id
    }

    fn spawn_balloon(&mut self, view: &mut impl Presenter) {
        let bounds = view.playfield_bounds();
        let size = activation::balloon_size(bounds);
        let pos = activation::random_point(&mut self.rng, bounds, size);
        let balloon = GameObject::new(ObjectKind::Balloon, Position::Point(pos)).with_size(size);
        self.activate(balloon, view);
    }

    fn spawn_ball(&mut self, view: &mut impl Presenter) {
        let Variant::Bounce(t) = self.config.variant else {
            return;
        };
        let bounds = view.playfield_bounds();
        let size = Vec2::splat(t.ball_size);
        let pos = activation::random_point(&mut self.rng, bounds, size);
        let vel = activation::random_velocity(&mut self.rng, t.min_speed, t.max_speed);
        let ball = GameObject::new(ObjectKind::Ball, Position::Point(pos))
            .with_size(size)
            .with_velocity(vel);
        self.activate(ball, view);
    }

    /// Score an object's outcome and take it off the board
    fn resolve(&mut self, id: ObjectId, outcome: Outcome, view: &mut impl Presenter) {
        if self.registry.remove(id, &mut self.clock).is_none() {
            return;
        }
        log::debug!("Resolved {} as {:?}", id, outcome);
        self.apply_outcome(outcome, view);
        view.remove_object_visual(id, Removal::Resolved(outcome));
    }

    fn apply_outcome(&mut self, outcome: Outcome, view: &mut impl Presenter) {
        let change = self.scoring.record(outcome);
        self.activation.observe_score(change.score);
        view.update_score_display(change.score, change.delta);
    }

    fn clear_objects(&mut self, view: &mut impl Presenter) {
        for object in self.registry.clear(&mut self.clock) {
            view.remove_object_visual(object.id, Removal::Cleared);
        }
    }

    /// Replace the pending decision with a fresh one. `delay` overrides the
    /// policy's delay. Nothing is armed unless running; the bounce game stops
    /// growing at its population cap.
    fn arm_decision(&mut self, delay: Option<Millis>) {
        self.cancel_decision();
        if self.run_state != RunState::Running {
            return;
        }
        if let Variant::Bounce(_) = self.config.variant {
            if !self.activation.has_capacity(self.registry.len()) {
                return;
            }
        }
        let delay = delay.unwrap_or_else(|| self.activation.next_delay(&mut self.rng));
        self.decision = Some(self.clock.schedule(delay, TimerEvent::Decide));
    }

    fn cancel_decision(&mut self) {
        if let Some(handle) = self.decision.take() {
            self.clock.cancel(handle);
        }
    }

    fn status(&self, view: &mut impl Presenter, text: &str, tone: Tone) {
        if self.kind() == GameKind::Tiles {
            view.set_status_message(text, tone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Bounds;
    use crate::tuning::{BounceTuning, TileTuning};
    use crate::view::{RecordingPresenter, ViewCall};

    fn tiles_with(blue_chance: f64) -> GameConfig {
        let mut config = GameConfig::tiles().with_seed(42);
        config.variant = Variant::Tiles(TileTuning {
            blue_chance,
            ..TileTuning::default()
        });
        config
    }

    /// Step the clock 1ms at a time until an object appears, so `now()` is
    /// exactly its activation time
    fn first_activation(engine: &mut GameEngine, view: &mut RecordingPresenter) -> ObjectId {
        let from = engine.now();
        let mut t = from;
        while engine.objects().is_empty() {
            t += 1;
            engine.advance(t, view);
            assert!(t < from + 10_000, "nothing activated");
        }
        engine.objects().ids()[0]
    }

    #[test]
    fn test_start_only_from_stopped() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::balloon().with_seed(1));
        engine.start(&mut view);
        assert_eq!(engine.run_state(), RunState::Running);
        assert!(engine.decision_pending());

        engine.advance(900, &mut view);
        assert_eq!(engine.objects().len(), 1);
        engine.start(&mut view);
        assert_eq!(engine.objects().len(), 1, "second start must not restart the run");
    }

    #[test]
    fn test_pause_cancels_all_timers() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::balloon().with_seed(1));
        engine.start(&mut view);
        engine.advance(2_000, &mut view);
        assert!(engine.objects().len() >= 2);

        engine.pause(&mut view);
        assert_eq!(engine.run_state(), RunState::Paused);
        assert_eq!(engine.pending_timers(), 0);
        let before = engine.objects().ids();

        // Time passing while paused changes nothing
        engine.advance(60_000, &mut view);
        assert_eq!(engine.objects().ids(), before);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_resume_grants_full_lifetime() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::balloon().with_seed(1));
        engine.start(&mut view);
        engine.advance(900, &mut view);
        let id = engine.objects().ids()[0];

        // 2000 of 2200ms used up, then pause
        engine.advance(2_900, &mut view);
        engine.pause(&mut view);
        engine.advance(10_000, &mut view);
        engine.resume(&mut view);

        // Original deadline would have been 3100; the new one is 12200
        engine.advance(12_199, &mut view);
        assert!(engine.objects().contains(id));
        engine.advance(12_200, &mut view);
        assert!(!engine.objects().contains(id));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(0.0));
        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        engine.on_object_interacted(id, &mut view);
        assert_eq!(engine.score(), 1);
        first_activation(&mut engine, &mut view);

        engine.reset(&mut view);
        assert_eq!(engine.run_state(), RunState::Stopped);
        assert_eq!(engine.score(), 0);
        assert!(engine.objects().is_empty());
        assert_eq!(engine.pending_timers(), 0);
        assert_eq!(engine.stage(), 0);
        assert_eq!(view.last_status(), Some((status::READY, Tone::Neutral)));
        assert!(view.calls.contains(&ViewCall::RunState(RunState::Stopped)));
    }

    #[test]
    fn test_red_hit() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(0.0));
        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        assert_eq!(engine.objects().get(id).unwrap().kind, ObjectKind::Red);

        engine.on_object_interacted(id, &mut view);
        assert_eq!(engine.score(), 1);
        assert!(engine.objects().is_empty());
        assert!(engine.decision_pending());
        assert_eq!(view.last_status(), Some((status::RED_HIT, Tone::Positive)));
        assert_eq!(view.removed(), vec![(id, Removal::Resolved(Outcome::Hit))]);
    }

    #[test]
    fn test_red_grace_then_miss() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(0.0).with_preset(DifficultyPreset::Easy));
        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        let activated_at = engine.now();

        engine.advance(activated_at + 1_499, &mut view);
        assert_eq!(engine.objects().get(id).unwrap().state(), Lifecycle::Active);
        engine.advance(activated_at + 1_500, &mut view);
        assert_eq!(engine.objects().get(id).unwrap().state(), Lifecycle::Grace);
        assert_eq!(engine.objects().active_count(), 0);

        engine.advance(activated_at + 1_700, &mut view);
        assert!(!engine.objects().contains(id));
        assert_eq!(engine.score(), 0, "floored at zero");
        assert!(view.calls.contains(&ViewCall::Score { score: 0, delta: -1 }));
    }

    #[test]
    fn test_click_during_grace_counts() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(0.0));
        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        let t = engine.now();
        engine.advance(t + 1_550, &mut view);
        assert_eq!(engine.objects().get(id).unwrap().state(), Lifecycle::Grace);

        engine.on_object_interacted(id, &mut view);
        assert_eq!(engine.score(), 1);
        assert!(!engine.objects().contains(id));
    }

    #[test]
    fn test_blue_avoided_and_hit() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(1.0));
        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        assert_eq!(engine.objects().get(id).unwrap().kind, ObjectKind::Blue);
        let t = engine.now();
        engine.advance(t + 1_500, &mut view);
        assert_eq!(engine.score(), 1);
        assert_eq!(view.last_status(), Some((status::BLUE_AVOIDED, Tone::Positive)));

        let id = first_activation(&mut engine, &mut view);
        engine.on_object_interacted(id, &mut view);
        assert_eq!(engine.score(), 0);
        assert_eq!(view.last_status(), Some((status::BLUE_HIT, Tone::Negative)));
    }

    #[test]
    fn test_idle_cell_click_penalized() {
        let mut view = RecordingPresenter::default();
        let mut config = tiles_with(0.0);
        config.scoring.floor = None;
        let mut engine = GameEngine::new(config);
        engine.start(&mut view);
        engine.on_cell_interacted(3, &mut view);
        assert_eq!(engine.score(), -1);
        assert_eq!(view.last_status(), Some((status::IDLE_CLICK, Tone::Negative)));
    }

    #[test]
    fn test_out_of_range_cell_ignored() {
        let mut view = RecordingPresenter::default();
        let mut config = tiles_with(0.0);
        config.scoring.floor = None;
        let mut engine = GameEngine::new(config);
        engine.start(&mut view);
        engine.on_cell_interacted(16, &mut view);
        engine.on_cell_interacted(usize::MAX, &mut view);
        assert_eq!(engine.score(), 0);
        assert_eq!(view.last_score(), Some(0));

        engine.on_cell_interacted(15, &mut view);
        assert_eq!(engine.score(), -1);
        assert_eq!(view.last_score(), Some(-1));
    }

    #[test]
    fn test_extreme_tile_steps_do_not_panic() {
        let mut view = RecordingPresenter::default();
        let mut config = tiles_with(0.0);
        config.variant = Variant::Tiles(TileTuning {
            blue_chance: 0.0,
            delay_step_ms: Millis::MAX,
            active_step_ms: Millis::MAX,
            ..TileTuning::default()
        });
        let mut engine = GameEngine::new(config);
        engine.start(&mut view);
        for _ in 0..12 {
            let id = first_activation(&mut engine, &mut view);
            engine.on_object_interacted(id, &mut view);
        }
        assert_eq!(engine.score(), 12);
        assert_eq!(engine.stage(), 2);
        assert!(engine.decision_pending());
    }

    #[test]
    fn test_clicks_ignored_unless_running() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(0.0));
        engine.on_cell_interacted(0, &mut view);
        assert_eq!(engine.score(), 0);

        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        engine.pause(&mut view);
        engine.on_object_interacted(id, &mut view);
        assert!(engine.objects().contains(id));
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_difficulty_change_while_running() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(0.0));
        engine.on_difficulty_changed(DifficultyPreset::Medium, &mut view);
        assert_eq!(view.last_status(), Some(("Medium difficulty selected.", Tone::Neutral)));

        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        engine.on_difficulty_changed(DifficultyPreset::Hard, &mut view);
        assert!(!engine.objects().contains(id));
        assert!(engine.decision_pending());
        assert_eq!(engine.preset(), DifficultyPreset::Hard);
        assert_eq!(view.last_status(), Some(("Hard mode engaged!", Tone::Neutral)));
        assert!(view.removed().contains(&(id, Removal::Cleared)));

        // Same preset again is a no-op
        let calls = view.calls.len();
        engine.on_difficulty_changed(DifficultyPreset::Hard, &mut view);
        assert_eq!(view.calls.len(), calls);
    }

    #[test]
    fn test_difficulty_change_while_paused() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(tiles_with(0.0));
        engine.start(&mut view);
        let id = first_activation(&mut engine, &mut view);
        engine.pause(&mut view);

        engine.on_difficulty_changed(DifficultyPreset::Medium, &mut view);
        assert!(engine.objects().is_empty());
        assert!(!engine.decision_pending());
        assert!(view.removed().contains(&(id, Removal::Cleared)));
        assert_eq!(view.last_status(), Some(("Medium difficulty selected.", Tone::Neutral)));

        engine.resume(&mut view);
        assert!(engine.decision_pending());
    }

    #[test]
    fn test_difficulty_change_leaves_bounce_growth_alone() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(9));
        engine.start(&mut view);
        engine.advance(5_000, &mut view);
        engine.on_difficulty_changed(DifficultyPreset::Hard, &mut view);
        assert_eq!(engine.preset(), DifficultyPreset::Hard);

        // Growth still lands at 6000, not 11000
        engine.advance(6_000, &mut view);
        assert_eq!(engine.objects().len(), 5);
    }

    #[test]
    fn test_visibility_auto_pause_is_one_way() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(5));
        engine.on_visibility_hidden(&mut view);
        assert_eq!(engine.run_state(), RunState::Stopped);

        engine.start(&mut view);
        engine.on_visibility_hidden(&mut view);
        assert_eq!(engine.run_state(), RunState::Paused);
        engine.on_visibility_hidden(&mut view);
        assert_eq!(engine.run_state(), RunState::Paused);
    }

    #[test]
    fn test_bounce_start_and_growth() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(9));
        engine.start(&mut view);
        assert_eq!(engine.objects().len(), 4);
        assert_eq!(engine.objects().armed_count(), 0);

        engine.advance(5_999, &mut view);
        assert_eq!(engine.objects().len(), 4);
        engine.advance(6_000, &mut view);
        assert_eq!(engine.objects().len(), 5);
        engine.advance(12_000, &mut view);
        assert_eq!(engine.objects().len(), 6);
    }

    #[test]
    fn test_bounce_click_refills_fast() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(9));
        engine.start(&mut view);
        engine.advance(1_000, &mut view);
        let id = engine.objects().ids()[0];

        engine.on_object_interacted(id, &mut view);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.objects().len(), 3);
        engine.advance(1_400, &mut view);
        assert_eq!(engine.objects().len(), 4);
    }

    #[test]
    fn test_bounce_growth_stops_at_cap() {
        let mut view = RecordingPresenter::default();
        let mut config = GameConfig::bounce().with_seed(9);
        config.variant = Variant::Bounce(BounceTuning {
            max_balls: 5,
            ..BounceTuning::default()
        });
        let mut engine = GameEngine::new(config);
        engine.start(&mut view);
        engine.advance(60_000, &mut view);
        assert_eq!(engine.objects().len(), 5);
        assert!(!engine.decision_pending());
    }

    #[test]
    fn test_bounce_frames_stay_in_bounds() {
        let mut view = RecordingPresenter::new(Bounds::new(300.0, 200.0));
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(11));
        engine.start(&mut view);
        let mut ts = 0.0;
        for _ in 0..600 {
            ts += 16.7;
            engine.frame(ts, &mut view);
        }
        for object in engine.objects().iter() {
            let Position::Point(p) = object.position else {
                panic!("ball without a point position");
            };
            assert!(p.x >= 0.0 && p.x <= 300.0 - 56.0);
            assert!(p.y >= 0.0 && p.y <= 200.0 - 56.0);
        }
    }

    #[test]
    fn test_bounce_resize_clamps_balls() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(13));
        engine.start(&mut view);
        engine.advance(12_000, &mut view);
        assert_eq!(engine.objects().len(), 6);

        view.take();
        view.record_moves = true;
        view.bounds = Bounds::new(120.0, 90.0);
        engine.on_resize(&mut view);

        let moves: Vec<_> = view
            .take()
            .into_iter()
            .filter_map(|c| match c {
                ViewCall::Move(id, pos) => Some((id, pos)),
                _ => None,
            })
            .collect();
        assert_eq!(moves.len(), engine.objects().len());
        for object in engine.objects().iter() {
            let Position::Point(p) = object.position else {
                panic!("ball without a point position");
            };
            assert!(p.x >= 0.0 && p.x <= 120.0 - 56.0);
            assert!(p.y >= 0.0 && p.y <= 90.0 - 56.0);
            assert!(moves.contains(&(object.id, object.position)));
        }
    }

    #[test]
    fn test_frames_report_every_ball_move() {
        let mut view = RecordingPresenter::default();
        view.record_moves = true;
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(13));
        engine.start(&mut view);
        view.take();
        engine.frame(0.0, &mut view);
        engine.frame(16.0, &mut view);
        let moves = view
            .take()
            .into_iter()
            .filter(|c| matches!(c, ViewCall::Move(..)))
            .count();
        assert_eq!(moves, 2 * engine.objects().len());
    }

    #[test]
    fn test_first_frame_after_resume_does_not_jump() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::bounce().with_seed(3));
        engine.start(&mut view);
        engine.frame(0.0, &mut view);
        engine.frame(16.0, &mut view);
        engine.pause(&mut view);
        let before: Vec<_> = engine.objects().iter().map(|o| o.position).collect();

        engine.resume(&mut view);
        engine.frame(500_000.0, &mut view);
        let after: Vec<_> = engine.objects().iter().map(|o| o.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_balloon_resize_keeps_balloons_inside() {
        let mut view = RecordingPresenter::default();
        let mut engine = GameEngine::new(GameConfig::balloon().with_seed(2));
        engine.start(&mut view);
        engine.advance(2_000, &mut view);
        view.bounds = Bounds::new(200.0, 150.0);
        engine.on_resize(&mut view);
        for object in engine.objects().iter() {
            let Position::Point(p) = object.position else {
                panic!("balloon without a point position");
            };
            assert!(p.x + object.size.x <= 200.0);
            assert!(p.y + object.size.y <= 150.0);
        }
    }
}
