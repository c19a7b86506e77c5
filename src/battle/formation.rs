//! Formation geometry: strength, position and facing to soldier placements
//!
//! Two variants: the dense square Turtle (rank and file) and the loose
//! circular Rabble (concentric rings of doubling size with seeded jitter).
//! The formation also yields the regiment's overall collision radius.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::battle::constants::{
    RABBLE_ANGLE_JITTER, RABBLE_LAYER_RADIUS, RABBLE_RADIUS_JITTER, TURTLE_SPACING,
};
use crate::core::types::Vec2;

/// Owner's spatial frame, passed in on every layout pass
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub position: Vec2,
    pub direction: Vec2,
    pub left: Vec2,
}

#[derive(Debug, Clone)]
pub enum Formation {
    Turtle(Turtle),
    Rabble(Rabble),
}

impl Formation {
    pub fn turtle() -> Self {
        Formation::Turtle(Turtle::default())
    }

    pub fn rabble(jitter_seed: u64) -> Self {
        Formation::Rabble(Rabble::new(jitter_seed))
    }

    pub fn is_turtle(&self) -> bool {
        matches!(self, Formation::Turtle(_))
    }

    /// Recompute layout metadata and slots for a new strength; returns the
    /// new bounding radius.
    pub fn rebuild(&mut self, strength: u32, pose: &Pose) -> f32 {
        match self {
            Formation::Turtle(t) => t.rebuild(strength, pose),
            Formation::Rabble(r) => r.rebuild(strength, pose),
        }
    }

    /// Re-derive slot positions after the owner moved or turned; strength
    /// unchanged, so layout metadata is kept.
    pub fn reposition(&mut self, pose: &Pose) {
        match self {
            Formation::Turtle(t) => t.reposition(pose),
            Formation::Rabble(r) => r.reposition(pose),
        }
    }

    /// World-space position of soldier `index` (stable ordering: rank-major
    /// for Turtle, layer-major for Rabble)
    pub fn soldier_position(&self, index: usize) -> Option<Vec2> {
        self.slots().get(index).copied()
    }

    pub fn soldier_count(&self) -> usize {
        self.slots().len()
    }

    pub fn radius(&self) -> f32 {
        match self {
            Formation::Turtle(t) => t.radius,
            Formation::Rabble(r) => r.radius,
        }
    }

    fn slots(&self) -> &[Vec2] {
        match self {
            Formation::Turtle(t) => &t.slots,
            Formation::Rabble(r) => &r.slots,
        }
    }
}

/// Dense rank-and-file square: files = ceil(sqrt(strength))
#[derive(Debug, Clone, Default)]
pub struct Turtle {
    n_files: u32,
    n_ranks: u32,
    incomplete_rank: u32,
    radius: f32,
    slots: Vec<Vec2>,
}

impl Turtle {
    fn rebuild(&mut self, strength: u32, pose: &Pose) -> f32 {
        self.n_files = ((strength as f32).sqrt().ceil() as u32).max(1);
        self.n_ranks = strength / self.n_files;
        self.incomplete_rank = strength - self.n_files * self.n_ranks;
        self.radius = self.n_files as f32 * TURTLE_SPACING * 0.5;
        self.slots.resize(strength as usize, Vec2::ZERO);
        self.reposition(pose);
        self.radius
    }

    fn reposition(&mut self, pose: &Pose) {
        let files_middle = (self.n_files.saturating_sub(1)) as f32 * TURTLE_SPACING * 0.5;
        let ranks_middle = (self.n_ranks.saturating_sub(1)) as f32 * TURTLE_SPACING * 0.5;
        let mut i = 0;
        for rank in 0..=self.n_ranks {
            let row_len = if rank < self.n_ranks { self.n_files } else { self.incomplete_rank };
            let rank_offset = pose.direction * (ranks_middle - rank as f32 * TURTLE_SPACING);
            for file in 0..row_len {
                let file_offset = pose.left * (file as f32 * TURTLE_SPACING - files_middle);
                self.slots[i] = pose.position + rank_offset + file_offset;
                i += 1;
            }
        }
    }
}

/// Loose concentric rings: layer `l` holds 2^l slots, outermost may be partial
///
/// Jitter is drawn from a generator re-seeded with the same value on every
/// layout pass, so idle soldiers do not dance from frame to frame and two
/// passes at equal strength produce identical placements.
#[derive(Debug, Clone)]
pub struct Rabble {
    n_layers: u32,
    incomplete_layer: u32,
    seed: u64,
    radius: f32,
    slots: Vec<Vec2>,
}

impl Rabble {
    fn new(seed: u64) -> Self {
        Self { n_layers: 0, incomplete_layer: 0, seed, radius: 0.0, slots: Vec::new() }
    }

    fn rebuild(&mut self, strength: u32, pose: &Pose) -> f32 {
        self.n_layers = if strength == 0 { 0 } else { strength.ilog2() };
        let full = (1u32 << self.n_layers) - 1;
        self.incomplete_layer = strength - full;
        self.radius = (self.n_layers as f32).max(0.5) * RABBLE_LAYER_RADIUS;
        self.slots.resize(strength as usize, Vec2::ZERO);
        self.reposition(pose);
        self.radius
    }

    fn reposition(&mut self, pose: &Pose) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut layer_size: u32 = 1;
        let mut i = 0;
        for layer in 0..=self.n_layers {
            let count = if layer < self.n_layers { layer_size } else { self.incomplete_layer };
            let step = std::f32::consts::TAU / layer_size as f32;
            let mut angle: f32 = rng.gen::<f32>() * std::f32::consts::TAU;
            for _ in 0..count {
                let angle_noise = angle + rng.gen_range(-RABBLE_ANGLE_JITTER..RABBLE_ANGLE_JITTER) * step;
                let radius_noise =
                    layer as f32 * (RABBLE_LAYER_RADIUS + rng.gen_range(-RABBLE_RADIUS_JITTER..RABBLE_RADIUS_JITTER));
                self.slots[i] =
                    pose.position + Vec2::new(angle_noise.cos(), angle_noise.sin()) * radius_noise;
                angle += step;
                i += 1;
            }
            layer_size *= 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pose() -> Pose {
        let direction = Vec2::new(0.0, -1.0);
        Pose { position: Vec2::new(500.0, 500.0), direction, left: direction.left() }
    }

    #[test]
    fn test_turtle_counts_and_radius() {
        let mut f = Formation::turtle();
        let radius = f.rebuild(36, &pose());
        assert_eq!(f.soldier_count(), 36);
        // 6 files at 22px spacing
        assert!((radius - 66.0).abs() < 1e-4);
    }

    #[test]
    fn test_turtle_files_round_up() {
        let mut f = Formation::turtle();
        f.rebuild(10, &pose());
        assert_eq!(f.soldier_count(), 10);
        match &f {
            Formation::Turtle(t) => assert_eq!(t.n_files, 4),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_rabble_layers() {
        let mut f = Formation::rabble(9);
        // 63 = five full layers of 1+2+4+8+16, plus 32 in the outer ring
        f.rebuild(63, &pose());
        assert_eq!(f.soldier_count(), 63);
        match &f {
            Formation::Rabble(r) => {
                assert_eq!(r.n_layers, 5);
                assert_eq!(r.incomplete_layer, 32);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_rabble_rebuild_is_deterministic() {
        let mut a = Formation::rabble(1234);
        let mut b = Formation::rabble(1234);
        a.rebuild(40, &pose());
        b.rebuild(40, &pose());
        for i in 0..40 {
            assert_eq!(a.soldier_position(i), b.soldier_position(i));
        }
        // rebuilding in place at the same strength must not move anyone
        let before: Vec<_> = (0..40).map(|i| a.soldier_position(i).unwrap()).collect();
        a.rebuild(40, &pose());
        let after: Vec<_> = (0..40).map(|i| a.soldier_position(i).unwrap()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = Formation::rabble(1);
        let mut b = Formation::rabble(2);
        a.rebuild(40, &pose());
        b.rebuild(40, &pose());
        let moved = (0..40).any(|i| a.soldier_position(i) != b.soldier_position(i));
        assert!(moved);
    }

    #[test]
    fn test_soldier_position_out_of_range() {
        let mut f = Formation::turtle();
        f.rebuild(9, &pose());
        assert!(f.soldier_position(8).is_some());
        assert!(f.soldier_position(9).is_none());
    }

    proptest! {
        #[test]
        fn prop_soldier_count_matches_strength(strength in 1u32..300) {
            let mut turtle = Formation::turtle();
            turtle.rebuild(strength, &pose());
            prop_assert_eq!(turtle.soldier_count(), strength as usize);
            prop_assert!(turtle.radius() > 0.0);

            let mut rabble = Formation::rabble(strength as u64);
            rabble.rebuild(strength, &pose());
            prop_assert_eq!(rabble.soldier_count(), strength as usize);
            prop_assert!(rabble.radius() > 0.0);
        }
    }
}
