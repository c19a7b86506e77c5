//! Global collision pass: pairwise circle overlap, impulses, boundary clamp
//!
//! Runs once per tick after every agent has updated. Overlapping pairs get
//! symmetric pushes scaled by penetration depth, enemies harder than allies,
//! and overlapping enemies are enlisted into each other's in-combat sets.

use crate::battle::constants::{PUSH_OPPOSED, PUSH_SAME_FACTION};
use crate::battle::simulation::AgentSlab;
use crate::core::types::{Rect, Vec2};

pub(crate) fn resolve_collisions(agents: &mut AgentSlab, bounds: &Rect) {
    let n = agents.capacity();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = match agents.pair_mut(i, j) {
                Some(pair) => pair,
                None => continue,
            };
            if a.is_dead() || b.is_dead() || !a.circle.overlaps(&b.circle) {
                continue;
            }
            let depth = a.circle.overlap_depth(&b.circle);
            let mut dir = (a.position() - b.position()).normalize();
            if dir == Vec2::ZERO {
                // concentric circles still need to separate somewhere
                dir = Vec2::new(1.0, 0.0);
            }
            let opposed = a.faction.is_enemy(b.faction);
            let scale = if opposed { PUSH_OPPOSED } else { PUSH_SAME_FACTION };
            let push = dir * (depth * scale);
            a.speed += push;
            b.speed -= push;
            if opposed {
                if !a.combat.contains(&b.id) {
                    a.combat.push(b.id);
                }
                if !b.combat.contains(&a.id) {
                    b.combat.push(a.id);
                }
            } else {
                if !a.allies.contains(&b.id) {
                    a.allies.push(b.id);
                }
                if !b.allies.contains(&a.id) {
                    b.allies.push(a.id);
                }
            }
        }
    }
    for i in 0..n {
        if let Some(agent) = agents.slot_mut(i) {
            agent.circle.center = bounds.clamp_point(agent.position());
        }
    }
}
