/// The step function: advances the world by one tick.
///
/// Per rabbit, in id order:
///   1. Decide: ask each behaviour, in priority order, for a state.
///      The first `Some` wins and is written onto the rabbit.
///   2. Apply : offer that state to each behaviour, in the same order,
///      until one reports it handled it.
///
/// After every rabbit has moved, kill requests raised during the tick are
/// drained and the dead rabbits removed.
///
/// A state nobody proposes or nobody handles is an invariant violation:
/// the tick stops and the error is returned to the caller.

use std::fmt;

use log::{debug, info};

use crate::domain::behaviour::{Behaviour, Changes, SaveState};
use crate::domain::entity::Rabbit;
use crate::domain::falling::Falling;
use crate::domain::state::State;
use crate::domain::terrain::Terrain;
use crate::domain::walking::Walking;
use crate::error::{EngineError, SaveError};

use super::event::GameEvent;
use super::world::World;

// ══════════════════════════════════════════════════════════════
// Behaviour chain
// ══════════════════════════════════════════════════════════════

/// One rabbit's behaviours, highest priority first.
pub struct BehaviourChain {
    behaviours: Vec<Box<dyn Behaviour>>,
}

impl BehaviourChain {
    /// Gravity first, then ground movement.
    pub fn standard() -> Self {
        BehaviourChain::with(vec![Box::new(Falling::new()), Box::new(Walking::new())])
    }

    pub fn with(behaviours: Vec<Box<dyn Behaviour>>) -> Self {
        BehaviourChain { behaviours }
    }

    /// Decision phase. Pure: nothing is mutated.
    pub fn propose(&self, rabbit: &Rabbit, terrain: &Terrain) -> Option<State> {
        self.behaviours.iter().find_map(|b| b.new_state(rabbit, terrain))
    }

    /// Decide, record and apply one state for `rabbit`.
    pub fn step(
        &mut self,
        terrain: &Terrain,
        changes: &mut Changes,
        rabbit: &mut Rabbit,
    ) -> Result<State, EngineError> {
        let state = self
            .propose(rabbit, terrain)
            .ok_or(EngineError::NoStateProposed { id: rabbit.id })?;

        rabbit.state = state;

        let handled = self
            .behaviours
            .iter_mut()
            .any(|b| b.behave(terrain, changes, rabbit, state));

        if handled {
            Ok(state)
        } else {
            Err(EngineError::UnhandledState { id: rabbit.id, state })
        }
    }

    pub fn save_state(&self, saved: &mut SaveState) {
        for b in &self.behaviours {
            b.save_state(saved);
        }
    }

    /// Restore every behaviour. Each one falls back to its defaults on bad
    /// input; the problems are returned so the caller can report them.
    pub fn restore_from_state(&mut self, saved: &SaveState) -> Vec<SaveError> {
        self.behaviours
            .iter_mut()
            .filter_map(|b| b.restore_from_state(saved).err())
            .collect()
    }
}

impl Default for BehaviourChain {
    fn default() -> Self {
        BehaviourChain::standard()
    }
}

impl fmt::Debug for BehaviourChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut saved = SaveState::new();
        self.save_state(&mut saved);
        f.debug_struct("BehaviourChain")
            .field("order", &self.behaviours.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("state", &saved)
            .finish()
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World) -> Result<Vec<GameEvent>, EngineError> {
    let mut events = Vec::new();
    world.tick += 1;

    let World { terrain, actors, changes, tick, .. } = world;
    for actor in actors.iter_mut() {
        let before = actor.rabbit.state;
        let after = actor.behaviours.step(terrain, changes, &mut actor.rabbit)?;
        if before != after {
            debug!(
                "tick {tick}: rabbit {} {before} -> {after} at ({}, {})",
                actor.rabbit.id, actor.rabbit.x, actor.rabbit.y
            );
        }
    }

    resolve_kills(world, &mut events);
    Ok(events)
}

fn resolve_kills(world: &mut World, events: &mut Vec<GameEvent>) {
    let killed = world.changes.take_killed();
    if killed.is_empty() {
        return;
    }

    for id in killed {
        if let Some(actor) = world.remove_rabbit(id) {
            let r = &actor.rabbit;
            info!("tick {}: rabbit {id} died ({}) at ({}, {})", world.tick, r.state, r.x, r.y);
            events.push(GameEvent::RabbitKilled { id, x: r.x, y: r.y, state: r.state });
        }
    }

    if world.actors.is_empty() {
        info!("tick {}: no rabbits left", world.tick);
        events.push(GameEvent::AllRabbitsGone);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
