//! A mounted roots view: owns the tree, its canvas, and the frame schedule

use crate::canvas::Canvas;
use crate::domain::Domain;
use crate::scores::DomainScores;
use crate::tree::{GrowOutcome, Tree, MAX_THICKNESS, MIN_THICKNESS};
use log::{debug, info};
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

/// Thickness added per meditation
pub const MEDITATION_STEP: f32 = 0.1;

/// Trunk thickness multiplier, raised by meditating
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thickness {
    value: f32,
}

impl Default for Thickness {
    fn default() -> Self {
        Self { value: MIN_THICKNESS }
    }
}

impl Thickness {
    pub fn new(value: f32) -> Self {
        let value = if value.is_finite() {
            value.clamp(MIN_THICKNESS, MAX_THICKNESS)
        } else {
            MIN_THICKNESS
        };
        Self { value }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Raise by one step, never past the maximum
    pub fn meditate(&mut self) -> f32 {
        self.value = (self.value + MEDITATION_STEP).min(MAX_THICKNESS);
        self.value
    }
}

/// Holds at most one pending frame deadline
#[derive(Debug)]
pub struct FrameScheduler {
    interval: Duration,
    pending: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval, pending: None }
    }

    /// Replace whatever frame was pending with one due `interval` from `now`
    pub fn schedule(&mut self, now: Instant) {
        self.cancel();
        self.pending = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Consume the pending frame if it is due
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the pending frame, if any
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.pending.map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Everything a view needs besides its size
#[derive(Clone, Copy, Debug)]
pub struct ViewParams {
    pub scores: DomainScores,
    pub thickness: Thickness,
    pub base_hue: f32,
    pub frame_interval: Duration,
}

pub struct RootsView {
    tree: Tree,
    canvas: Canvas,
    scores: DomainScores,
    thickness: Thickness,
    base_hue: f32,
    rng: StdRng,
    frames: FrameScheduler,
    frame_count: u64,
    paused: bool,
}

impl RootsView {
    /// Build the view and its first tree, and schedule the first frame
    pub fn mount(width: usize, height: usize, params: ViewParams, rng: StdRng, now: Instant) -> Self {
        let ViewParams { scores, thickness, base_hue, frame_interval } = params;
        let mut view = Self {
            tree: Tree::new(width, height, Some(scores), thickness.value(), base_hue),
            canvas: Canvas::new(width, height),
            scores,
            thickness,
            base_hue,
            rng,
            frames: FrameScheduler::new(frame_interval),
            frame_count: 0,
            paused: false,
        };
        view.frames.schedule(now);
        info!("mounted {}x{} view", width, height);
        view
    }

    /// Throw the tree away and start over at the given size
    pub fn resize(&mut self, width: usize, height: usize, now: Instant) {
        self.frames.cancel();
        self.tree = Tree::new(
            width,
            height,
            Some(self.scores),
            self.thickness.value(),
            self.base_hue,
        );
        if self.canvas.size() == (width, height) {
            self.canvas.clear();
        } else {
            self.canvas = Canvas::new(width, height);
        }
        self.frame_count = 0;
        self.frames.schedule(now);
        debug!("view reinitialized at {}x{}", width, height);
    }

    /// Regrow at the current size, picking up any new thickness
    pub fn regrow(&mut self, now: Instant) {
        let (width, height) = self.canvas.size();
        self.resize(width, height, now);
    }

    /// Stop scheduling frames
    pub fn unmount(&mut self) {
        self.frames.cancel();
    }

    /// Run the pending frame if it is due, then schedule the next one.
    /// Returns whether a frame was advanced.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.frames.take_due(now) {
            return false;
        }
        if !self.paused {
            self.tree.advance_frame(&mut self.rng, &mut self.canvas);
            self.frame_count += 1;
        }
        self.frames.schedule(now);
        !self.paused
    }

    /// Advance one frame immediately, outside the schedule
    pub fn step(&mut self) {
        self.tree.advance_frame(&mut self.rng, &mut self.canvas);
        self.frame_count += 1;
    }

    pub fn grow(&mut self, domain: Domain) -> GrowOutcome {
        self.tree.grow_domain(domain)
    }

    /// Thicken the trunk of the next tree; the current one is untouched
    pub fn meditate(&mut self) -> f32 {
        let value = self.thickness.meditate();
        info!("meditation: trunk thickness now {:.1}", value);
        value
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn time_until_frame(&self, now: Instant) -> Option<Duration> {
        self.frames.time_until(now)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn thickness(&self) -> Thickness {
        self.thickness
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
