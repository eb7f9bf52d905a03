/// Events emitted during a simulation step.
/// The runner consumes these for logging and display.

use crate::domain::state::State;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    RabbitKilled { id: usize, x: i32, y: i32, state: State },
    AllRabbitsGone,
}
