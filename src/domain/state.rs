/// The closed set of rabbit states.
///
/// Every behaviour speaks this vocabulary: one behaviour proposes a state,
/// and the behaviour that owns it applies it. `owner()` is an exhaustive
/// match, so a new state without an owner does not compile.

use std::fmt;

use super::entity::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum State {
    WalkingLeft,
    WalkingRight,
    RisingLeft1,
    RisingLeft2,
    RisingRight1,
    RisingRight2,
    TurningLeftToRight,
    TurningRightToLeft,

    Falling,
    Falling1,
    Falling1ToDeath,
    FallingOntoLowerLeft,
    FallingOntoLowerRight,
    FallingOntoRiseLeft,
    FallingOntoRiseRight,
    Falling1OntoLowerLeft,
    Falling1OntoLowerRight,
    Falling1OntoRiseLeft,
    Falling1OntoRiseRight,
    DyingOfFalling,
    DyingOfFalling2,

    Digging,
}

/// Which behaviour applies a state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Owner {
    Walking,
    Falling,
    /// Applied by a behaviour outside this engine (e.g. Digging).
    External,
}

impl State {
    pub const ALL: [State; 22] = [
        State::WalkingLeft,
        State::WalkingRight,
        State::RisingLeft1,
        State::RisingLeft2,
        State::RisingRight1,
        State::RisingRight2,
        State::TurningLeftToRight,
        State::TurningRightToLeft,
        State::Falling,
        State::Falling1,
        State::Falling1ToDeath,
        State::FallingOntoLowerLeft,
        State::FallingOntoLowerRight,
        State::FallingOntoRiseLeft,
        State::FallingOntoRiseRight,
        State::Falling1OntoLowerLeft,
        State::Falling1OntoLowerRight,
        State::Falling1OntoRiseLeft,
        State::Falling1OntoRiseRight,
        State::DyingOfFalling,
        State::DyingOfFalling2,
        State::Digging,
    ];

    pub fn walking(dir: Direction) -> Self {
        match dir {
            Direction::Left => State::WalkingLeft,
            Direction::Right => State::WalkingRight,
        }
    }

    pub fn owner(self) -> Owner {
        use State::*;
        match self {
            WalkingLeft | WalkingRight
            | RisingLeft1 | RisingLeft2 | RisingRight1 | RisingRight2
            | TurningLeftToRight | TurningRightToLeft => Owner::Walking,

            Falling | Falling1 | Falling1ToDeath
            | FallingOntoLowerLeft | FallingOntoLowerRight
            | FallingOntoRiseLeft | FallingOntoRiseRight
            | Falling1OntoLowerLeft | Falling1OntoLowerRight
            | Falling1OntoRiseLeft | Falling1OntoRiseRight
            | DyingOfFalling | DyingOfFalling2 => Owner::Falling,

            Digging => Owner::External,
        }
    }

    pub fn is_dying(self) -> bool {
        matches!(self, State::DyingOfFalling | State::DyingOfFalling2)
    }

    /// Stable name used in save files.
    pub fn name(self) -> &'static str {
        use State::*;
        match self {
            WalkingLeft            => "WALKING_LEFT",
            WalkingRight           => "WALKING_RIGHT",
            RisingLeft1            => "RISING_LEFT_1",
            RisingLeft2            => "RISING_LEFT_2",
            RisingRight1           => "RISING_RIGHT_1",
            RisingRight2           => "RISING_RIGHT_2",
            TurningLeftToRight     => "TURNING_LEFT_TO_RIGHT",
            TurningRightToLeft     => "TURNING_RIGHT_TO_LEFT",
            Falling                => "FALLING",
            Falling1               => "FALLING_1",
            Falling1ToDeath        => "FALLING_1_TO_DEATH",
            FallingOntoLowerLeft   => "FALLING_ONTO_LOWER_LEFT",
            FallingOntoLowerRight  => "FALLING_ONTO_LOWER_RIGHT",
            FallingOntoRiseLeft    => "FALLING_ONTO_RISE_LEFT",
            FallingOntoRiseRight   => "FALLING_ONTO_RISE_RIGHT",
            Falling1OntoLowerLeft  => "FALLING_1_ONTO_LOWER_LEFT",
            Falling1OntoLowerRight => "FALLING_1_ONTO_LOWER_RIGHT",
            Falling1OntoRiseLeft   => "FALLING_1_ONTO_RISE_LEFT",
            Falling1OntoRiseRight  => "FALLING_1_ONTO_RISE_RIGHT",
            DyingOfFalling         => "DYING_OF_FALLING",
            DyingOfFalling2        => "DYING_OF_FALLING_2",
            Digging                => "DIGGING",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        State::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_parse_back() {
        for s in State::ALL {
            assert_eq!(State::from_name(s.name()), Some(s));
        }
        assert_eq!(State::from_name("FLYING"), None);
    }

    #[test]
    fn only_falling_owns_death() {
        for s in State::ALL.iter().filter(|s| s.is_dying()) {
            assert_eq!(s.owner(), Owner::Falling);
        }
    }

    #[test]
    fn digging_is_external() {
        assert_eq!(State::Digging.owner(), Owner::External);
        assert_eq!(State::walking(Direction::Right).owner(), Owner::Walking);
    }
}
