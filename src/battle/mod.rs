//! Battle simulation: regiments, formations, melee, horns and the arena

pub mod collision;
pub mod combat;
pub mod constants;
pub mod faction;
pub mod formation;
pub mod horn;
pub mod regiment;
pub mod simulation;

pub use faction::{Faction, FactionTraits};
pub use formation::Formation;
pub use horn::HornBlast;
pub use regiment::{Cadaver, RegimentAgent, State};
pub use simulation::{BattleOutcome, Simulation};
