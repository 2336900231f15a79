//! The consciousness roots: a trunk, domain seeds, and everything grown since
//!
//! Branches are only ever appended. Dead branches stay in the collection so
//! they can serve as sources for later growth; their strokes stay on the
//! canvas because drawing is cumulative.

use crate::branch::{Branch, GENERATION_CAP};
use crate::canvas::{Point, Surface};
use crate::domain::Domain;
use crate::scores::DomainScores;
use log::debug;
use rand::Rng;

/// Frames the trunk grows before the domains seed from its tip
pub const TRUNK_CYCLES: u32 = 48;
/// Trunk thickness multiplier bounds
pub const MIN_THICKNESS: f32 = 1.0;
pub const MAX_THICKNESS: f32 = 3.0;
/// Every n-th growth of a domain extends a thick, shallow "major" branch
pub const MAJOR_BRANCH_INTERVAL: u32 = 10;
/// Most seeds a single domain plants automatically. Seed count follows the
/// depth score up to here and saturates above it; the depth counter itself
/// keeps the full score.
pub const MAX_AUTO_SEEDS: u32 = 24;

const TRUNK: usize = 0;
const TRUNK_WIDTH: f32 = 8.0;
/// Trunk travel per frame, in units of canvas height / 100
const TRUNK_SPEED: f32 = 0.625;
const MAJOR_MAX_GENERATION: f32 = 3.0;
/// Angular spacing between automatic seeds of the same domain
const SEED_SPREAD: f32 = 0.09;

/// What a `grow_domain` call did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GrowOutcome {
    /// Trunk still growing; nothing changed
    TrunkGrowing,
    /// First seed planted on the dead trunk
    Seeded { branch: usize },
    /// New branch grown from an existing dead domain branch
    Extended { source: usize, branch: usize, major: bool },
    /// Depth counted but no dead domain branch was available to grow from
    NoSource,
}

pub struct Tree {
    origin: Point,
    base_hue: f32,
    /// Converts simulation widths and speeds into canvas pixels
    scale: f32,
    next_index: usize,
    branches: Vec<Branch>,
    depths: [u32; 5],
    seeded: bool,
}

impl Tree {
    /// Fresh tree for a canvas of the given pixel size. Missing scores fall
    /// back to defaults, out-of-range thickness is clamped.
    pub fn new(
        width: usize,
        height: usize,
        scores: Option<DomainScores>,
        thickness: f32,
        base_hue: f32,
    ) -> Self {
        let scores = scores.unwrap_or_default();
        let thickness = if thickness.is_finite() {
            thickness.clamp(MIN_THICKNESS, MAX_THICKNESS)
        } else {
            MIN_THICKNESS
        };
        let scale = (height as f32 / 100.0).max(0.25);
        let origin = Point::new(width as f32 / 2.0, height as f32 * 0.92);

        let mut depths = [0; 5];
        for domain in Domain::ALL {
            depths[domain.index()] = scores.get(domain);
        }

        let speed = TRUNK_SPEED * scale;
        let trunk = Branch {
            index: TRUNK,
            parent: None,
            pos: origin,
            width: TRUNK_WIDTH * thickness,
            generation: 1.0,
            alive: true,
            age: 0,
            angle: -std::f32::consts::FRAC_PI_2,
            speed: (speed, speed),
            max_life: TRUNK_CYCLES as f32,
            probs: [0.0; 4],
            deviation: 0.15,
            domain: None,
            is_domain_root: false,
        };

        debug!(
            "new tree {}x{} thickness {:.1} depths {:?}",
            width, height, thickness, depths
        );

        Self {
            origin,
            base_hue,
            scale,
            next_index: TRUNK + 1,
            branches: vec![trunk],
            depths,
            seeded: false,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn trunk(&self) -> &Branch {
        &self.branches[TRUNK]
    }

    pub fn depth(&self, domain: Domain) -> u32 {
        self.depths[domain.index()]
    }

    /// Whether the domains have been seeded from the dead trunk
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn alive_count(&self) -> usize {
        self.branches.iter().filter(|b| b.alive).count()
    }

    fn push(&mut self, mut branch: Branch) -> usize {
        let index = self.next_index;
        debug_assert_eq!(index, self.branches.len());
        branch.index = index;
        self.next_index += 1;
        self.branches.push(branch);
        index
    }

    /// Grow every living branch by one frame and draw its new segment.
    /// Branches spawned during the pass are appended afterwards, so they
    /// first move on the next frame.
    pub fn advance_frame<R: Rng, S: Surface>(&mut self, rng: &mut R, surface: &mut S) {
        let (scale, base_hue) = (self.scale, self.base_hue);
        let mut spawned = Vec::new();

        for branch in self.branches.iter_mut().filter(|b| b.alive) {
            let segment = branch.grow(scale, base_hue);
            surface.stroke(&segment);

            let early = rng.gen::<f32>() < branch.early_death_chance();
            if !branch.is_expired() && !early {
                continue;
            }

            branch.alive = false;
            if branch.can_spawn() {
                for slot in 0..4 {
                    if rng.gen::<f32>() < branch.spawn_chance(slot) {
                        spawned.push(branch.child(slot));
                    }
                }
            }
        }

        for child in spawned {
            self.push(child);
        }

        if !self.seeded && !self.trunk().alive {
            self.seed_domains();
        }
    }

    /// Plant each domain's initial seeds on the trunk tip, as many as its
    /// depth (capped), fanned around the domain's seed angle.
    fn seed_domains(&mut self) {
        let trunk = self.trunk().clone();
        for domain in Domain::ALL {
            let count = self.depth(domain).min(MAX_AUTO_SEEDS);
            let center = (count as f32 - 1.0) / 2.0;
            for k in 0..count {
                let angle = domain.seed_angle() + (k as f32 - center) * SEED_SPREAD;
                self.push(Branch::seed(&trunk, domain, angle));
            }
        }
        self.seeded = true;
        debug!("domains seeded, {} branches", self.branches.len());
    }

    /// Add growth to a domain. A no-op until the trunk has finished growing.
    pub fn grow_domain(&mut self, domain: Domain) -> GrowOutcome {
        if self.trunk().alive {
            return GrowOutcome::TrunkGrowing;
        }

        let depth = self.depth(domain);
        let outcome = if depth == 0 {
            let seed = Branch::seed(self.trunk(), domain, domain.seed_angle());
            GrowOutcome::Seeded { branch: self.push(seed) }
        } else {
            match self.select_source(domain, depth) {
                Some((source, major)) => {
                    let branch = Branch::offshoot(&self.branches[source], depth, major);
                    let branch = self.push(branch);
                    GrowOutcome::Extended { source, branch, major }
                }
                None => GrowOutcome::NoSource,
            }
        };

        self.depths[domain.index()] += 1;
        debug!("grow {} -> depth {} ({:?})", domain, depth + 1, outcome);
        outcome
    }

    /// Pick the dead branch of `domain` to grow from. Branches at the
    /// generation cap never grow anything. Milestone growths take the
    /// thickest shallow branch; the rest walk the generation-sorted list
    /// using the depth as the position.
    fn select_source(&self, domain: Domain, depth: u32) -> Option<(usize, bool)> {
        let mut candidates: Vec<&Branch> = self
            .branches
            .iter()
            .filter(|b| !b.alive && b.domain == Some(domain) && b.generation < GENERATION_CAP)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        if (depth + 1) % MAJOR_BRANCH_INTERVAL == 0 {
            let thickest = candidates
                .iter()
                .filter(|b| b.generation < MAJOR_MAX_GENERATION)
                .min_by(|a, b| b.width.total_cmp(&a.width).then(a.index.cmp(&b.index)));
            if let Some(b) = thickest {
                return Some((b.index, true));
            }
        }

        candidates.sort_by(|a, b| {
            a.generation
                .total_cmp(&b.generation)
                .then(a.index.cmp(&b.index))
        });
        let pick = depth as usize % candidates.len();
        Some((candidates[pick].index, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Segment};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tree_with(scores: DomainScores) -> Tree {
        Tree::new(200, 100, Some(scores), 1.0, 200.0)
    }

    /// Advance until `done` holds, panicking after `limit` frames
    fn run_until<F: Fn(&Tree) -> bool>(tree: &mut Tree, rng: &mut StdRng, limit: u32, done: F) {
        let mut sink: Vec<Segment> = Vec::new();
        for _ in 0..limit {
            if done(tree) {
                return;
            }
            tree.advance_frame(rng, &mut sink);
        }
        assert!(done(tree), "condition not reached in {} frames", limit);
    }

    fn domain_roots(tree: &Tree, domain: Domain) -> usize {
        tree.branches()
            .iter()
            .filter(|b| b.domain == Some(domain) && b.is_domain_root)
            .count()
    }

    #[test]
    fn fresh_tree_is_a_single_living_trunk() {
        let tree = tree_with(DomainScores::default());
        assert_eq!(tree.branches().len(), 1);
        let trunk = tree.trunk();
        assert!(trunk.alive);
        assert_eq!(trunk.generation, 1.0);
        assert_eq!(trunk.domain, None);
        assert_eq!(trunk.pos, tree.origin());
        assert_eq!(tree.origin(), Point::new(100.0, 92.0));
    }

    #[test]
    fn missing_scores_use_defaults() {
        let tree = Tree::new(200, 100, None, 1.0, 200.0);
        for domain in Domain::ALL {
            assert_eq!(tree.depth(domain), DomainScores::default().get(domain));
        }
    }

    #[test]
    fn thickness_is_clamped() {
        let thin = Tree::new(200, 100, None, 0.2, 200.0);
        let thick = Tree::new(200, 100, None, 9.0, 200.0);
        let broken = Tree::new(200, 100, None, f32::NAN, 200.0);
        assert_eq!(thin.trunk().width, TRUNK_WIDTH * MIN_THICKNESS);
        assert_eq!(thick.trunk().width, TRUNK_WIDTH * MAX_THICKNESS);
        assert_eq!(broken.trunk().width, TRUNK_WIDTH * MIN_THICKNESS);
    }

    #[test]
    fn trunk_dies_after_fixed_cycles_and_seeds_domains() {
        let mut tree = tree_with(DomainScores::default());
        let mut rng = StdRng::seed_from_u64(7);
        let mut canvas = Canvas::new(200, 100);

        for _ in 0..TRUNK_CYCLES - 1 {
            tree.advance_frame(&mut rng, &mut canvas);
        }
        assert!(tree.trunk().alive);
        assert!(!tree.is_seeded());

        tree.advance_frame(&mut rng, &mut canvas);
        assert!(!tree.trunk().alive);
        assert!(tree.is_seeded());
        assert_eq!(tree.trunk().age, TRUNK_CYCLES);
    }

    #[test]
    fn spawned_branches_wait_for_the_next_frame() {
        let mut tree = tree_with(DomainScores::default());
        let mut rng = StdRng::seed_from_u64(1);
        run_until(&mut tree, &mut rng, 200, |t| t.is_seeded());
        assert!(tree.branches()[1..].iter().all(|b| b.age == 0 && b.alive));
    }

    #[test]
    fn auto_seeding_follows_scores() {
        let scores = DomainScores::zero()
            .with(Domain::SelfAwareness, 3)
            .with(Domain::LifeSciences, 0)
            .with(Domain::UniversalLaws, 6);
        let mut tree = tree_with(scores);
        let mut rng = StdRng::seed_from_u64(42);
        run_until(&mut tree, &mut rng, 200, |t| t.is_seeded());

        assert_eq!(tree.depth(Domain::SelfAwareness), 3);
        assert_eq!(tree.depth(Domain::LifeSciences), 0);
        assert_eq!(tree.depth(Domain::UniversalLaws), 6);
        assert_eq!(domain_roots(&tree, Domain::SelfAwareness), 3);
        assert_eq!(domain_roots(&tree, Domain::LifeSciences), 0);
        assert_eq!(domain_roots(&tree, Domain::UniversalLaws), 6);
        assert_eq!(tree.depth(Domain::CreativeExpression), 0);
    }

    #[test]
    fn grow_before_trunk_dies_is_a_noop() {
        let mut tree = tree_with(DomainScores::default());
        let mut rng = StdRng::seed_from_u64(3);
        let mut sink: Vec<Segment> = Vec::new();
        for _ in 0..5 {
            tree.advance_frame(&mut rng, &mut sink);
        }
        let before = tree.branches().len();
        for domain in Domain::ALL {
            for _ in 0..3 {
                assert_eq!(tree.grow_domain(domain), GrowOutcome::TrunkGrowing);
            }
            assert_eq!(tree.depth(domain), DomainScores::default().get(domain));
        }
        assert_eq!(tree.branches().len(), before);
    }

    #[test]
    fn first_growth_plants_a_domain_root() {
        let mut tree = tree_with(DomainScores::zero());
        let mut rng = StdRng::seed_from_u64(5);
        run_until(&mut tree, &mut rng, 200, |t| t.is_seeded());
        assert_eq!(tree.branches().len(), 1);

        let outcome = tree.grow_domain(Domain::CreativeExpression);
        let branch = match outcome {
            GrowOutcome::Seeded { branch } => branch,
            other => panic!("expected a seed, got {:?}", other),
        };
        assert_eq!(tree.depth(Domain::CreativeExpression), 1);
        let seed = &tree.branches()[branch];
        assert!(seed.is_domain_root);
        assert_eq!(seed.domain, Some(Domain::CreativeExpression));
        assert_eq!(seed.angle, Domain::CreativeExpression.seed_angle());
        assert_eq!(seed.pos, tree.trunk().pos);
    }

    #[test]
    fn every_growth_adds_exactly_one_depth() {
        let mut tree = tree_with(DomainScores::zero().with(Domain::LifeSciences, 1));
        let mut rng = StdRng::seed_from_u64(11);
        run_until(&mut tree, &mut rng, 200, |t| t.is_seeded());

        // Some of these find no dead source yet; the counter moves regardless
        for n in 1..=25 {
            tree.grow_domain(Domain::LifeSciences);
            assert_eq!(tree.depth(Domain::LifeSciences), 1 + n);
            let mut sink: Vec<Segment> = Vec::new();
            tree.advance_frame(&mut rng, &mut sink);
        }
    }

    #[test]
    fn growth_only_extends_dead_branches_of_the_same_domain() {
        let scores = DomainScores::zero()
            .with(Domain::UniversalLaws, 1)
            .with(Domain::SelfAwareness, 4);
        let mut tree = tree_with(scores);
        let mut rng = StdRng::seed_from_u64(99);
        run_until(&mut tree, &mut rng, 400, |t| {
            t.is_seeded()
                && t.branches()
                    .iter()
                    .any(|b| !b.alive && b.domain == Some(Domain::UniversalLaws))
        });

        // Depth 1 -> 2 -> 3
        for _ in 0..2 {
            match tree.grow_domain(Domain::UniversalLaws) {
                GrowOutcome::Extended { source, branch, .. } => {
                    let src = &tree.branches()[source];
                    assert!(!src.alive);
                    assert_eq!(src.domain, Some(Domain::UniversalLaws));
                    assert_eq!(tree.branches()[branch].domain, Some(Domain::UniversalLaws));
                    assert_eq!(tree.branches()[branch].parent, Some(source));
                }
                other => panic!("expected an extension, got {:?}", other),
            }
        }
        assert_eq!(tree.depth(Domain::UniversalLaws), 3);
    }

    #[test]
    fn selection_is_deterministic() {
        let scores = DomainScores::zero().with(Domain::SocialConnection, 5);
        let build = || {
            let mut tree = tree_with(scores);
            let mut rng = StdRng::seed_from_u64(2024);
            run_until(&mut tree, &mut rng, 600, |t| t.is_seeded() && t.alive_count() == 0);
            tree
        };
        let mut a = build();
        let mut b = build();
        for _ in 0..12 {
            assert_eq!(
                a.grow_domain(Domain::SocialConnection),
                b.grow_domain(Domain::SocialConnection)
            );
        }
    }

    #[test]
    fn milestone_growth_takes_the_thickest_shallow_branch() {
        let scores = DomainScores::zero().with(Domain::LifeSciences, 8);
        let mut tree = tree_with(scores);
        let mut rng = StdRng::seed_from_u64(8);
        run_until(&mut tree, &mut rng, 600, |t| t.is_seeded() && t.alive_count() == 0);

        // Depth 8 -> 9 is ordinary, 9 -> 10 is the milestone
        assert!(matches!(
            tree.grow_domain(Domain::LifeSciences),
            GrowOutcome::Extended { major: false, .. }
        ));
        let thickest = tree
            .branches()
            .iter()
            .filter(|b| !b.alive && b.domain == Some(Domain::LifeSciences) && b.generation < 3.0)
            .map(|b| b.width)
            .fold(f32::MIN, f32::max);
        match tree.grow_domain(Domain::LifeSciences) {
            GrowOutcome::Extended { source, major, .. } => {
                assert!(major);
                assert_eq!(tree.branches()[source].width, thickest);
            }
            other => panic!("expected a major extension, got {:?}", other),
        }
    }

    #[test]
    fn generations_increase_and_respect_the_cap() {
        let mut tree = tree_with(DomainScores::zero().with(Domain::SelfAwareness, 10));
        let mut rng = StdRng::seed_from_u64(123);
        run_until(&mut tree, &mut rng, 2000, |t| t.is_seeded() && t.alive_count() == 0);

        let branches = tree.branches();
        for branch in branches {
            if let Some(parent) = branch.parent {
                let parent = &branches[parent];
                assert!(branch.generation > parent.generation);
                assert!(parent.generation < GENERATION_CAP);
            }
        }
    }

    #[test]
    fn manual_growth_never_extends_capped_branches() {
        let mut tree = tree_with(DomainScores::zero().with(Domain::SelfAwareness, 1));
        let mut rng = StdRng::seed_from_u64(31);
        run_until(&mut tree, &mut rng, 2000, |t| t.is_seeded() && t.alive_count() == 0);

        let mut sink: Vec<Segment> = Vec::new();
        for _ in 0..60 {
            if let GrowOutcome::Extended { source, .. } = tree.grow_domain(Domain::SelfAwareness) {
                assert!(tree.branches()[source].generation < GENERATION_CAP);
            }
            for _ in 0..300 {
                tree.advance_frame(&mut rng, &mut sink);
            }
        }
        assert_eq!(tree.depth(Domain::SelfAwareness), 61);

        let branches = tree.branches();
        let capped_parents = branches
            .iter()
            .filter_map(|b| b.parent)
            .filter(|&p| branches[p].generation >= GENERATION_CAP)
            .count();
        assert_eq!(capped_parents, 0);
        assert!(branches.iter().all(|b| b.generation < GENERATION_CAP + 1.0));
    }

    #[test]
    fn only_capped_sources_give_no_source() {
        let mut tree = tree_with(DomainScores::zero().with(Domain::CreativeExpression, 1));
        let mut rng = StdRng::seed_from_u64(6);
        run_until(&mut tree, &mut rng, 2000, |t| t.is_seeded() && t.alive_count() == 0);
        for branch in tree.branches.iter_mut().skip(1) {
            branch.generation = GENERATION_CAP;
        }

        assert_eq!(tree.grow_domain(Domain::CreativeExpression), GrowOutcome::NoSource);
        assert_eq!(tree.depth(Domain::CreativeExpression), 2);
    }

    #[test]
    fn auto_seeding_saturates_at_the_seed_cap() {
        let mut tree = tree_with(DomainScores::zero().with(Domain::SocialConnection, 200));
        let mut rng = StdRng::seed_from_u64(12);
        run_until(&mut tree, &mut rng, 200, |t| t.is_seeded());
        assert_eq!(domain_roots(&tree, Domain::SocialConnection), MAX_AUTO_SEEDS as usize);
        assert_eq!(tree.depth(Domain::SocialConnection), 200);
    }

    #[test]
    fn growth_terminates() {
        let mut tree = tree_with(DomainScores::zero().with(Domain::UniversalLaws, MAX_AUTO_SEEDS));
        let mut rng = StdRng::seed_from_u64(77);
        run_until(&mut tree, &mut rng, 3000, |t| t.is_seeded() && t.alive_count() == 0);
    }

    #[test]
    fn reinitializing_discards_prior_branches() {
        let mut tree = tree_with(DomainScores::default());
        let mut rng = StdRng::seed_from_u64(4);
        run_until(&mut tree, &mut rng, 200, |t| t.is_seeded());
        assert!(tree.branches().len() > 1);

        tree = Tree::new(320, 120, None, 2.0, 200.0);
        assert_eq!(tree.branches().len(), 1);
        assert!(tree.trunk().alive);
        assert_eq!(tree.trunk().generation, 1.0);
    }
}
