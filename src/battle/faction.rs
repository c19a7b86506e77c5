//! Faction identities and their capability descriptors
//!
//! One concrete agent type serves both sides; everything faction-specific is
//! data in `FactionTraits`, not a subclass.

use serde::{Deserialize, Serialize};

use crate::battle::formation::Formation;

/// One side of the battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Roman,
    Barbarian,
}

/// Capability parameters injected into the shared agent type
#[derive(Debug, Clone)]
pub struct FactionTraits {
    /// Headcount of a freshly deployed regiment
    pub regiment_size: u32,
    /// Advance speed, pixels per millisecond
    pub speed_factor: f32,
    /// Chance that a swing lands before the defender's block is considered
    pub hit_chance: f64,
    /// Block chance while formed up, against frontal attacks only
    pub block_chance_formed: f64,
    /// Block chance for a loose mob, and for formed troops caught in the flank
    pub block_chance_unformed: f64,
    /// Attacks arriving at less than this facing angle (degrees) count as
    /// flank or rear hits and break the formation open
    pub frontal_arc_deg: f32,
    /// Turn-rate cap while formed up, radians per millisecond
    pub max_turn_formed: f32,
    /// Turn-rate cap for a loose mob
    pub max_turn_unformed: f32,
    /// Whether fresh regiments deploy in the dense square formation
    pub starts_formed_up: bool,
    /// Idle observers of this faction cannot see enemies hidden in forest
    /// until a horn has alerted them
    pub forest_blind_when_idle: bool,
}

const ROMAN_TRAITS: FactionTraits = FactionTraits {
    regiment_size: 36,
    speed_factor: 0.6,
    hit_chance: 0.5,
    block_chance_formed: 0.7,
    block_chance_unformed: 0.3,
    frontal_arc_deg: 135.0,
    // 40 degrees per second formed, 90 loose
    max_turn_formed: 40.0 * std::f32::consts::PI / 180.0 / 1000.0,
    max_turn_unformed: 90.0 * std::f32::consts::PI / 180.0 / 1000.0,
    starts_formed_up: true,
    forest_blind_when_idle: true,
};

const BARBARIAN_TRAITS: FactionTraits = FactionTraits {
    regiment_size: 63, // 1 + 2 + 4 + ... + 32, five full rabble layers
    speed_factor: 0.1,
    hit_chance: 0.7,
    block_chance_formed: 0.2, // barbarians never form the turtle
    block_chance_unformed: 0.2,
    frontal_arc_deg: 135.0,
    max_turn_formed: 90.0 * std::f32::consts::PI / 180.0 / 1000.0,
    max_turn_unformed: 90.0 * std::f32::consts::PI / 180.0 / 1000.0,
    starts_formed_up: false,
    forest_blind_when_idle: false,
};

impl Faction {
    pub fn traits(self) -> &'static FactionTraits {
        match self {
            Faction::Roman => &ROMAN_TRAITS,
            Faction::Barbarian => &BARBARIAN_TRAITS,
        }
    }

    pub fn is_enemy(self, other: Faction) -> bool {
        self != other
    }

    pub fn is_ally(self, other: Faction) -> bool {
        self == other
    }

    /// Deployment formation for a new regiment of this faction
    pub fn create_formation(self, jitter_seed: u64) -> Formation {
        if self.traits().starts_formed_up {
            Formation::turtle()
        } else {
            Formation::rabble(jitter_seed)
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Roman => write!(f, "roman"),
            Faction::Barbarian => write!(f, "barbarian"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_and_ally_predicates() {
        assert!(Faction::Roman.is_enemy(Faction::Barbarian));
        assert!(!Faction::Roman.is_enemy(Faction::Roman));
        assert!(Faction::Barbarian.is_ally(Faction::Barbarian));
    }

    #[test]
    fn test_deployment_formations() {
        assert!(Faction::Roman.create_formation(1).is_turtle());
        assert!(!Faction::Barbarian.create_formation(1).is_turtle());
    }

    #[test]
    fn test_formed_block_beats_unformed() {
        let t = Faction::Roman.traits();
        assert!(t.block_chance_formed > t.block_chance_unformed);
    }
}
