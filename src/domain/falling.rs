/// Falling: gravity, fall-height accumulation, landing and death by fall.
///
/// ## Support
///
/// A rabbit does NOT fall if ANY of:
///   - a flat block is directly below it
///   - it is standing on a slope (`on_slope`)
///
/// ## Decision Table
///
/// ┌──────────────────────────────────────────────┬───────────────────────┐
/// │ Condition (priority order)                    │ Proposed state        │
/// ├──────────────────────────────────────────────┼───────────────────────┤
/// │ climbing, or digging                          │ None (defer)          │
/// │ supported, height > FATAL_HEIGHT, even        │ DyingOfFalling        │
/// │ supported, height > FATAL_HEIGHT, odd         │ DyingOfFalling2       │
/// │ supported                                     │ None                  │
/// │ height + 1 > FATAL_HEIGHT, and flat two below │ Falling1ToDeath       │
/// │   or any block one below                      │                       │
/// │ block one below rising our way                │ Falling1OntoRise*     │
/// │ block one below, otherwise                    │ Falling1OntoLower*    │
/// │ flat block two below                          │ Falling1              │
/// │ slope two below rising our way                │ FallingOntoRise*      │
/// │ slope two below, otherwise                    │ FallingOntoLower*     │
/// │ nothing within two below                      │ Falling               │
/// └──────────────────────────────────────────────┴───────────────────────┘
///
/// Death ignores slope geometry: a rabbit dying on a slope plays the same
/// death as one dying on flat ground.

use crate::error::SaveError;

use super::behaviour::{self, Behaviour, Changes, SaveState};
use super::entity::Rabbit;
use super::state::State;
use super::terrain::Terrain;

/// Rabbits that fall further than this die on landing.
pub const FATAL_HEIGHT: i32 = 4;

const HEIGHT_FALLEN_KEY: &str = "Falling.heightFallen";

#[derive(Clone, Debug, Default)]
pub struct Falling {
    height_fallen: i32,
}

impl Falling {
    pub fn new() -> Self {
        Falling { height_fallen: 0 }
    }

    pub fn height_fallen(&self) -> i32 {
        self.height_fallen
    }

    /// Is the rabbit unsupported this tick?
    pub fn falling(rabbit: &Rabbit, terrain: &Terrain) -> bool {
        let below = rabbit.y + 1;
        !(terrain.flat_block_at(rabbit.x, below) || rabbit.on_slope)
    }

    fn landing_state(&self) -> Option<State> {
        if self.height_fallen <= FATAL_HEIGHT {
            return None;
        }
        if self.height_fallen % 2 == 0 {
            Some(State::DyingOfFalling)
        } else {
            Some(State::DyingOfFalling2)
        }
    }

    fn falling_state(&self, rabbit: &Rabbit, terrain: &Terrain) -> State {
        let (x, y) = (rabbit.x, rabbit.y);
        let block1_down = terrain.block_at(x, y + 1);

        if self.height_fallen + 1 > FATAL_HEIGHT
            && (terrain.flat_block_at(x, y + 2) || block1_down.is_some())
        {
            return State::Falling1ToDeath;
        }

        if let Some(block) = block1_down {
            return if block.rise_dir() == Some(rabbit.dir) {
                rabbit.rl(State::Falling1OntoRiseRight, State::Falling1OntoRiseLeft)
            } else {
                // Slope facing away: we land on its low side.
                rabbit.rl(State::Falling1OntoLowerRight, State::Falling1OntoLowerLeft)
            };
        }

        match terrain.block_at(x, y + 2) {
            None => State::Falling,
            Some(block) if block.is_flat() => State::Falling1,
            Some(block) if block.rise_dir() == Some(rabbit.dir) => {
                rabbit.rl(State::FallingOntoRiseRight, State::FallingOntoRiseLeft)
            }
            Some(_) => rabbit.rl(State::FallingOntoLowerRight, State::FallingOntoLowerLeft),
        }
    }

    /// Apply the movement part of a state. `false` if the state is not ours.
    fn move_rabbit(&mut self, changes: &mut Changes, rabbit: &mut Rabbit, state: State) -> bool {
        let drop = match state {
            State::DyingOfFalling | State::DyingOfFalling2 => {
                changes.kill_rabbit(rabbit);
                return true;
            }
            State::Falling
            | State::FallingOntoLowerRight
            | State::FallingOntoLowerLeft
            | State::FallingOntoRiseRight
            | State::FallingOntoRiseLeft => 2,
            State::Falling1ToDeath
            | State::Falling1
            | State::Falling1OntoLowerRight
            | State::Falling1OntoLowerLeft
            | State::Falling1OntoRiseRight
            | State::Falling1OntoRiseLeft => 1,
            _ => {
                self.height_fallen = 0;
                return false;
            }
        };
        self.height_fallen += drop;
        rabbit.y += drop;
        true
    }
}

impl Behaviour for Falling {
    fn name(&self) -> &'static str {
        "Falling"
    }

    fn new_state(&self, rabbit: &Rabbit, terrain: &Terrain) -> Option<State> {
        if rabbit.climbing_active || rabbit.state == State::Digging {
            return None;
        }

        if !Self::falling(rabbit, terrain) {
            // A non-fatal landing proposes nothing; the counter is zeroed
            // when the next behaviour's state is offered to `behave`.
            return self.landing_state();
        }

        Some(self.falling_state(rabbit, terrain))
    }

    fn behave(
        &mut self,
        terrain: &Terrain,
        changes: &mut Changes,
        rabbit: &mut Rabbit,
        state: State,
    ) -> bool {
        let handled = self.move_rabbit(changes, rabbit, state);

        if handled {
            // Whenever we fall onto a slope, we are on top of it.
            rabbit.on_slope = terrain
                .block_at(rabbit.x, rabbit.y)
                .is_some_and(|b| b.is_slope());
        }

        handled
    }

    fn save_state(&self, saved: &mut SaveState) {
        behaviour::add_to_state_if_gt_zero(saved, HEIGHT_FALLEN_KEY, self.height_fallen);
    }

    fn restore_from_state(&mut self, saved: &SaveState) -> Result<(), SaveError> {
        match behaviour::restore_from_state(saved, HEIGHT_FALLEN_KEY, 0) {
            Ok(h) => {
                self.height_fallen = h.max(0);
                Ok(())
            }
            Err(e) => {
                self.height_fallen = 0;
                Err(e)
            }
        }
    }
}
