//! Deterministic simulation module
//!
//! All orchestration lives here. This module must stay deterministic:
//! - Fixed timestep only, driven by the session clock
//! - Seeded RNG only
//! - Stable iteration order (by body handle / creation order)
//! - No rendering or platform dependencies; those sit behind `surface`

pub mod blast;
pub mod choreo;
pub mod physics;
pub mod rapier;
pub mod selector;
pub mod session;
pub mod spawner;
pub mod sync;
pub mod timeline;
pub mod world;

pub use blast::{Blast, BlastState, Wind, falloff};
pub use choreo::{Choreographer, Cue, GlyphDrop, TimedCue};
pub use physics::{Aabb, BodyDesc, BodyHandle, BodyLabel, BodySnapshot, Physics};
pub use rapier::RapierPhysics;
pub use selector::{Chosen, SelectionState, Selector, pick_chosen};
pub use session::{Phase, Session, SessionSummary};
pub use spawner::{SpawnState, Spawner};
pub use sync::{LiveWords, destroy_word, emit};
pub use timeline::{Timeline, TimerId};
pub use world::World;
