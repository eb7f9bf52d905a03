/// The contract every rabbit behaviour implements, plus the helpers
/// behaviours use to persist their private counters.
///
/// ## Two phases per tick
///
///   1. **Decide**: `new_state(&self, ..)` sees the rabbit and terrain
///      through shared references only. `None` defers to the next
///      behaviour in priority order.
///   2. **Apply**: `behave(&mut self, ..)` receives the winning state and
///      mutates the rabbit. `false` means "not one of my states".
///
/// ## Save state
///
/// Counters are written into a sorted string map under
/// `"<Behaviour>.<field>"` keys. A counter at its default (0) is left out
/// entirely; a missing key restores as 0.

use std::collections::BTreeMap;

use crate::error::SaveError;

use super::entity::Rabbit;
use super::state::State;
use super::terrain::Terrain;

pub type SaveState = BTreeMap<String, String>;

/// World-level requests raised while applying states.
/// Drained by the world after the tick.
#[derive(Clone, Debug, Default)]
pub struct Changes {
    killed: Vec<usize>,
}

impl Changes {
    pub fn kill_rabbit(&mut self, rabbit: &Rabbit) {
        if !self.killed.contains(&rabbit.id) {
            self.killed.push(rabbit.id);
        }
    }

    pub fn killed(&self) -> &[usize] {
        &self.killed
    }

    pub fn take_killed(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.killed)
    }
}

pub trait Behaviour {
    /// Namespace for this behaviour's save keys.
    fn name(&self) -> &'static str;

    fn new_state(&self, rabbit: &Rabbit, terrain: &Terrain) -> Option<State>;

    fn behave(
        &mut self,
        terrain: &Terrain,
        changes: &mut Changes,
        rabbit: &mut Rabbit,
        state: State,
    ) -> bool;

    fn save_state(&self, saved: &mut SaveState);

    /// Restore counters. On a malformed value the counter is reset to its
    /// default and the error is returned for the caller to report.
    fn restore_from_state(&mut self, saved: &SaveState) -> Result<(), SaveError>;
}

pub fn add_to_state_if_gt_zero(saved: &mut SaveState, key: &str, value: i32) {
    if value > 0 {
        saved.insert(key.to_string(), value.to_string());
    }
}

/// Read an integer counter. Missing key → `default`.
pub fn restore_from_state(saved: &SaveState, key: &str, default: i32) -> Result<i32, SaveError> {
    match saved.get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| SaveError::MalformedValue {
            key: key.to_string(),
            value: value.clone(),
        }),
    }
}
