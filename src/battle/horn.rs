//! Horn blasts - timed, radius-bounded broadcast signals
//!
//! The only channel between regiments beyond direct contact. A blast is
//! delivered once, at the tick it is sounded, to every occupied tile whose
//! center lies within the propagation radius; each recipient then keeps its
//! own decaying copy.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{HORN_LIFETIME_MS, HORN_RADIUS_PX};
use crate::core::types::{AgentId, Vec2};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HornBlast {
    pub origin: Vec2,
    pub source: AgentId,
    /// Remaining audible lifetime in milliseconds
    pub life_ms: f32,
}

impl HornBlast {
    pub fn new(origin: Vec2, source: AgentId) -> Self {
        Self { origin, source, life_ms: HORN_LIFETIME_MS }
    }

    pub fn radius() -> f32 {
        HORN_RADIUS_PX
    }

    pub fn decay(&mut self, dt_ms: f32) {
        self.life_ms -= dt_ms;
    }

    pub fn is_audible(&self) -> bool {
        self.life_ms > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blast_expires_after_lifetime() {
        let mut blast = HornBlast::new(Vec2::ZERO, AgentId(0));
        assert!(blast.is_audible());
        blast.decay(HORN_LIFETIME_MS * 0.5);
        assert!(blast.is_audible());
        blast.decay(HORN_LIFETIME_MS);
        assert!(!blast.is_audible());
    }
}
