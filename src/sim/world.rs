/// World: the terrain plus every live rabbit and the behaviour state it owns.
///
/// ## Ownership
///
///   - `terrain`: read by behaviours, never written during a tick.
///   - `actors` : each rabbit paired with its own `BehaviourChain`, so
///     hidden counters (fall height) are per rabbit.
///   - `changes`: kill requests raised during a tick, drained by `step`.

use crate::domain::behaviour::Changes;
use crate::domain::entity::Rabbit;
use crate::domain::terrain::Terrain;

use super::step::BehaviourChain;

/// A rabbit together with the behaviours that drive it.
#[derive(Debug)]
pub struct Actor {
    pub rabbit: Rabbit,
    pub behaviours: BehaviourChain,
}

impl Actor {
    pub fn new(rabbit: Rabbit) -> Self {
        Actor { rabbit, behaviours: BehaviourChain::standard() }
    }
}

#[derive(Debug)]
pub struct World {
    pub name: String,
    pub terrain: Terrain,
    pub actors: Vec<Actor>,
    pub changes: Changes,
    pub tick: u64,
}

impl World {
    pub fn new(name: &str, terrain: Terrain) -> Self {
        World {
            name: name.to_string(),
            terrain,
            actors: vec![],
            changes: Changes::default(),
            tick: 0,
        }
    }

    /// Add a rabbit with a fresh behaviour chain.
    pub fn add_rabbit(&mut self, rabbit: Rabbit) {
        self.actors.push(Actor::new(rabbit));
    }

    pub fn rabbits(&self) -> impl Iterator<Item = &Rabbit> {
        self.actors.iter().map(|a| &a.rabbit)
    }

    pub fn rabbit(&self, id: usize) -> Option<&Rabbit> {
        self.rabbits().find(|r| r.id == id)
    }

    pub fn rabbit_at(&self, x: i32, y: i32) -> Option<&Rabbit> {
        self.rabbits().find(|r| r.x == x && r.y == y)
    }

    pub fn num_rabbits(&self) -> usize {
        self.actors.len()
    }

    /// Drop a rabbit from the simulation. Returns it if it was present.
    pub fn remove_rabbit(&mut self, id: usize) -> Option<Actor> {
        let idx = self.actors.iter().position(|a| a.rabbit.id == id)?;
        Some(self.actors.remove(idx))
    }
}
