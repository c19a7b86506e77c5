//! Battle constants - all tunable values in one place
//!
//! Distances are pixels, durations are milliseconds, speeds are pixels per
//! millisecond and turn rates are radians per millisecond.

// Grid and perception
pub const TILE_SIZE_PX: f32 = 128.0;
/// Half-extent of the square perception window scanned every tick
pub const PERCEPTION_RADIUS_PX: f32 = TILE_SIZE_PX * 5.0;

// Melee
pub const ATTACK_INTERVAL_MS: f32 = 1000.0;
pub const MAX_KILLS_PER_SOLDIER: u32 = 3;
/// A regiment routs once it falls below this fraction of its initial strength
pub const FLEE_STRENGTH_FRACTION: u32 = 4; // strength < initial / 4

// Impulse physics
/// Velocity decay applied once per tick after integration
pub const FRICTION: f32 = 0.7;
/// Below this speed the velocity snaps to zero to kill residual drift
pub const MIN_SPEED: f32 = 0.05;
/// Push scale for overlapping regiments of the same faction
pub const PUSH_SAME_FACTION: f32 = 0.01;
/// Push scale for overlapping enemies; they jostle apart more assertively
pub const PUSH_OPPOSED: f32 = 0.03;
/// Nudge a tile-sharing regiment applies to the blocking occupant
pub const SHARING_PUSH: f32 = 0.001;

// Formation geometry
pub const TURTLE_SPACING: f32 = 22.0;
pub const RABBLE_LAYER_RADIUS: f32 = 26.0;
pub const RABBLE_RADIUS_JITTER: f32 = RABBLE_LAYER_RADIUS * 0.4;
pub const RABBLE_ANGLE_JITTER: f32 = 0.3;

// Horn signalling
pub const HORN_LIFETIME_MS: f32 = 1000.0;
pub const HORN_RADIUS_PX: f32 = TILE_SIZE_PX * 10.0;

// Roman rally behavior
/// Adjacent formed-up allies needed to stand and defend
pub const DEFEND_MIN_ALLIES: usize = 3;
/// How long a rallying regiment marches toward a horn before giving up
pub const RALLY_TIMEOUT_MS: f32 = 5000.0;

// Waiting regiments drift toward active allies at a fraction of full speed
pub const IDLE_DRIFT_FACTOR: f32 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friction_is_decay() {
        assert!(FRICTION > 0.0 && FRICTION < 1.0);
    }

    #[test]
    fn test_enemies_push_harder_than_allies() {
        assert!(PUSH_OPPOSED > PUSH_SAME_FACTION);
        assert!(SHARING_PUSH < PUSH_SAME_FACTION);
    }

    #[test]
    fn test_horn_carries_past_perception() {
        assert!(HORN_RADIUS_PX >= PERCEPTION_RADIUS_PX);
    }

    #[test]
    fn test_spacing_fits_in_a_tile() {
        assert!(TURTLE_SPACING * 2.0 < TILE_SIZE_PX);
        assert!(RABBLE_LAYER_RADIUS * 2.0 < TILE_SIZE_PX);
    }
}
