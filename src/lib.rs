//! Shieldwall - Tactical Battle Simulation Core
//!
//! Autonomous regiments perceive through a uniform tile grid, decide behavior
//! via a finite-state AI, move and collide in continuous 2D space, resolve
//! melee stochastically and coordinate through horn blasts. Rendering, camera
//! and scene control live outside this crate; the host drives the simulation
//! one tick at a time.

pub mod battle;
pub mod core;
pub mod spatial;
