use crate::canvas::{Point, Segment};
use crate::colors::{branch_color, SEGMENT_ALPHA};
use crate::domain::Domain;

/// Width multiplier applied every frame a branch grows
pub const TAPER: f32 = 0.985;
/// Branches thinner than this never spawn children
pub const MIN_SPAWN_WIDTH: f32 = 0.6;
/// Branches at or beyond this generation never spawn children
pub const GENERATION_CAP: f32 = 5.0;
/// Spawn probabilities are divided by generation^GENERATION_EXPONENT
pub const GENERATION_EXPONENT: f32 = 1.2;
/// Children inherit their parent's probabilities scaled by this
pub const PROBABILITY_DECAY: f32 = 0.8;
/// Per-frame early death chance, multiplied by generation
pub const EARLY_DEATH_PER_GENERATION: f32 = 0.0015;

/// Base lifetime of a domain seed
pub const SEED_LIFE: f32 = 40.0;
const SEED_PROBS: [f32; 4] = [0.9, 0.9, 0.6, 0.4];
const SEED_DEVIATION: f32 = 0.35;

/// Angular offsets of the four possible children, in units of deviation
const CHILD_OFFSETS: [f32; 4] = [-0.55, 0.55, -0.2, 0.25];

/// A single growing (or grown) stroke of the roots
#[derive(Clone, Debug)]
pub struct Branch {
    pub index: usize,
    pub parent: Option<usize>,
    pub pos: Point,
    pub width: f32,
    pub generation: f32,
    pub alive: bool,
    pub age: u32,
    pub angle: f32,
    pub speed: (f32, f32),
    pub max_life: f32,
    pub probs: [f32; 4],
    pub deviation: f32,
    pub domain: Option<Domain>,
    pub is_domain_root: bool,
}

impl Branch {
    /// Age at which the branch stops growing
    pub fn life_limit(&self) -> f32 {
        self.max_life / self.generation.max(1.0).sqrt()
    }

    pub fn can_spawn(&self) -> bool {
        self.width > MIN_SPAWN_WIDTH && self.generation < GENERATION_CAP
    }

    /// Chance that child slot `slot` (0..4) appears when this branch dies
    pub fn spawn_chance(&self, slot: usize) -> f32 {
        self.probs[slot] / self.generation.max(1.0).powf(GENERATION_EXPONENT)
    }

    /// Per-frame chance of dying before reaching the life limit.
    /// The trunk (generation 1) always runs its full course.
    pub fn early_death_chance(&self) -> f32 {
        if self.generation <= 1.0 {
            0.0
        } else {
            EARLY_DEATH_PER_GENERATION * self.generation
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age as f32 >= self.life_limit()
    }

    /// Advance one frame: age, drift the heading, move, taper.
    /// Returns the stroke covering the distance just travelled.
    pub fn grow(&mut self, scale: f32, base_hue: f32) -> Segment {
        let from = self.pos;
        self.age += 1;

        // Slow deterministic sway; the index offsets siblings from each other
        let phase = self.age as f32 * 0.15 + self.index as f32;
        self.angle += self.deviation * 0.02 * phase.sin();

        self.pos.x += self.angle.cos() * self.speed.0;
        self.pos.y += self.angle.sin() * self.speed.1;
        self.width *= TAPER;

        Segment {
            from,
            to: self.pos,
            width: self.width * scale,
            color: branch_color(base_hue, self.domain, self.age, self.generation),
            alpha: SEGMENT_ALPHA,
        }
    }

    /// Random child for slot `slot`, spawned when this branch dies
    pub fn child(&self, slot: usize) -> Branch {
        Branch {
            index: 0,
            parent: Some(self.index),
            pos: self.pos,
            width: self.width * 0.85,
            generation: self.generation + 1.0,
            alive: true,
            age: 0,
            angle: self.angle + CHILD_OFFSETS[slot] * self.deviation,
            speed: (self.speed.0 * 0.92, self.speed.1 * 0.92),
            max_life: self.max_life * 0.85,
            probs: self.probs.map(|p| p * PROBABILITY_DECAY),
            deviation: self.deviation * 1.05,
            domain: self.domain,
            is_domain_root: false,
        }
    }

    /// First branch of a domain, leaving the dead trunk at `angle`
    pub fn seed(trunk: &Branch, domain: Domain, angle: f32) -> Branch {
        Branch {
            index: 0,
            parent: Some(trunk.index),
            pos: trunk.pos,
            width: trunk.width * 0.65,
            generation: 1.5,
            alive: true,
            age: 0,
            angle,
            speed: (trunk.speed.0 * 0.9, trunk.speed.1 * 0.9),
            max_life: SEED_LIFE,
            probs: SEED_PROBS,
            deviation: SEED_DEVIATION,
            domain: Some(domain),
            is_domain_root: true,
        }
    }

    /// Deliberate extension grown from a dead source branch. Every value is
    /// derived from the source and the domain depth; nothing is random.
    pub fn offshoot(source: &Branch, depth: u32, major: bool) -> Branch {
        let sign = if depth % 2 == 0 { 1.0 } else { -1.0 };
        let bend = 0.4 + 0.15 * (depth % 3) as f32;
        let (width_factor, life_factor) = if major { (1.0, 1.0) } else { (0.8, 0.85) };

        Branch {
            index: 0,
            parent: Some(source.index),
            pos: source.pos,
            width: source.width * width_factor,
            generation: source.generation + 0.5,
            alive: true,
            age: 0,
            angle: source.angle + sign * bend * source.deviation,
            speed: source.speed,
            max_life: source.max_life * life_factor,
            probs: source.probs.map(|p| p * PROBABILITY_DECAY),
            deviation: source.deviation,
            domain: source.domain,
            is_domain_root: false,
        }
    }
}
