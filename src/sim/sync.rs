//! Body ↔ presentation pairing and the per-tick sync bridge
//!
//! Every live word body has exactly one presented element and vice versa.
//! Pairs are created and destroyed together; only the spawner (insert, cap
//! eviction) and the blast (chosen word) remove entries.

use std::collections::{HashMap, VecDeque};

use super::physics::{BodyHandle, Physics};
use super::world::World;
use crate::error::soft;
use crate::surface::{Stage, VisualId};

/// Owned bidirectional map of live word pairs, remembering creation order
#[derive(Debug, Clone, Default)]
pub struct LiveWords {
    by_body: HashMap<BodyHandle, VisualId>,
    by_visual: HashMap<VisualId, BodyHandle>,
    order: VecDeque<BodyHandle>,
}

impl LiveWords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: BodyHandle, visual: VisualId) {
        if self.by_body.insert(body, visual).is_none() {
            self.order.push_back(body);
        }
        self.by_visual.insert(visual, body);
    }

    pub fn visual_of(&self, body: BodyHandle) -> Option<VisualId> {
        self.by_body.get(&body).copied()
    }

    pub fn body_of(&self, visual: VisualId) -> Option<BodyHandle> {
        self.by_visual.get(&visual).copied()
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.by_body.contains_key(&body)
    }

    pub fn len(&self) -> usize {
        self.by_body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_body.is_empty()
    }

    /// Pairs in creation order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, VisualId)> + '_ {
        self.order
            .iter()
            .filter_map(|b| self.by_body.get(b).map(|v| (*b, *v)))
    }

    /// Forget a pair. Returns its element if it was live.
    pub fn remove(&mut self, body: BodyHandle) -> Option<VisualId> {
        let visual = self.by_body.remove(&body)?;
        self.by_visual.remove(&visual);
        if self.order.front() == Some(&body) {
            self.order.pop_front();
        } else {
            self.order.retain(|b| *b != body);
        }
        Some(visual)
    }

    /// Oldest bodies that must go for the live count to fit `cap`
    pub fn overflow(&self, cap: usize) -> Vec<BodyHandle> {
        let excess = self.len().saturating_sub(cap);
        self.order.iter().take(excess).copied().collect()
    }
}

/// Destroy a word pair: body, mapping and element together.
/// Returns false when the pair was already gone.
pub fn destroy_word<P: Physics>(
    world: &mut World<P>,
    live: &mut LiveWords,
    stage: &mut dyn Stage,
    body: BodyHandle,
) -> bool {
    let Some(visual) = live.remove(body) else {
        return false;
    };
    world.remove_body(body);
    soft("remove word element", stage.remove_word(visual));
    true
}

/// Push every live word's transform to the stage
pub fn emit<P: Physics>(world: &World<P>, live: &LiveWords, stage: &mut dyn Stage) {
    for (body, visual) in live.iter() {
        let Some(snapshot) = world.body(body) else {
            continue;
        };
        if let Err(e) = stage.place_word(visual, snapshot.position, snapshot.angle) {
            log::debug!("place word {}: {e}", visual.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::config::Viewport;
    use crate::headless::HeadlessStage;
    use crate::sim::rapier::RapierPhysics;
    use crate::sim::physics::{BodyDesc, BodyLabel};

    #[test]
    fn test_overflow_takes_oldest() {
        let mut live = LiveWords::new();
        for i in 1..=5 {
            live.insert(BodyHandle(i), VisualId(i * 10));
        }
        assert_eq!(live.overflow(3), vec![BodyHandle(1), BodyHandle(2)]);
        assert!(live.overflow(5).is_empty());
        assert!(live.overflow(10).is_empty());
    }

    #[test]
    fn test_remove_keeps_maps_in_step() {
        let mut live = LiveWords::new();
        live.insert(BodyHandle(1), VisualId(7));
        live.insert(BodyHandle(2), VisualId(8));
        live.insert(BodyHandle(3), VisualId(9));

        assert_eq!(live.remove(BodyHandle(2)), Some(VisualId(8)));
        assert_eq!(live.remove(BodyHandle(2)), None);
        assert_eq!(live.body_of(VisualId(8)), None);
        assert_eq!(
            live.iter().collect::<Vec<_>>(),
            vec![(BodyHandle(1), VisualId(7)), (BodyHandle(3), VisualId(9))]
        );
        assert_eq!(live.overflow(1), vec![BodyHandle(1)]);
    }

    #[test]
    fn test_destroy_then_emit_skips_the_pair() {
        let mut world = World::new(RapierPhysics::new(), Viewport::new(800.0, 600.0), 0.5);
        let mut stage = HeadlessStage::new();
        let mut live = LiveWords::new();

        let mut spawn = |world: &mut World<RapierPhysics>, stage: &mut HeadlessStage, x: f32| {
            let visual = stage.create_word("love", 20.0).unwrap();
            let body = world.add_body(BodyDesc::dynamic(
                BodyLabel::Word,
                Vec2::new(x, 100.0),
                visual.size,
            ));
            live.insert(body, visual.id);
            (body, visual.id)
        };
        let (a, va) = spawn(&mut world, &mut stage, 200.0);
        let (b, vb) = spawn(&mut world, &mut stage, 500.0);

        assert!(destroy_word(&mut world, &mut live, &mut stage, a));
        assert!(!destroy_word(&mut world, &mut live, &mut stage, a));
        assert!(!world.contains(a));

        emit(&world, &live, &mut stage);
        assert!(stage.placement(va).is_none());
        assert_eq!(stage.placement(vb).unwrap().x, 500.0);
        assert!(world.contains(b));
    }
}
