/// Entities: the rabbit and the direction it faces.
/// Behaviour-private counters are not stored here; they live in the
/// rabbit's behaviour chain (see `sim::step::BehaviourChain`).

use super::state::State;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Horizontal step for one cell of movement in this direction.
    pub fn dx(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self { Direction::Left => "L", Direction::Right => "R" }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "L" => Some(Direction::Left),
            "R" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// A rabbit: the only mutable surface behaviours touch.
///
/// `y` grows downward, so the floor a rabbit stands on is at `y + 1`.
/// A rabbit standing on a slope shares the slope's cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rabbit {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub state: State,
    pub on_slope: bool,
    /// Set by the Climbing behaviour while a climb is in progress.
    pub climbing_active: bool,
}

impl Rabbit {
    pub fn new(id: usize, x: i32, y: i32, dir: Direction) -> Self {
        Rabbit {
            id, x, y, dir,
            state: State::walking(dir),
            on_slope: false,
            climbing_active: false,
        }
    }

    /// Column the rabbit walks into next.
    pub fn dest(&self) -> i32 {
        self.x + self.dir.dx()
    }

    /// Pick between a right-facing and a left-facing variant.
    pub fn rl<T>(&self, right: T, left: T) -> T {
        match self.dir {
            Direction::Right => right,
            Direction::Left => left,
        }
    }
}
