/// Walking: ground locomotion, slope ascent and wall turns.
///
/// ## Decision Table (first match wins)
///
/// `dest` is the column in front of the rabbit.
///
/// ┌───────────────────────────────────────┬──────────────────┐
/// │ Condition                              │ Proposed state   │
/// ├───────────────────────────────────────┼──────────────────┤
/// │ block at (dest, y) rises our way       │ Rising*1         │
/// │ block at (x, y) rises our way          │ Rising*2         │
/// │ square block at (dest, y)              │ Turning*         │
/// │ Otherwise                              │ Walking*         │
/// └───────────────────────────────────────┴──────────────────┘
///
/// Climbing a one-block slope takes two frames: `Rising*1` steps into the
/// slope's cell, `Rising*2` steps diagonally up and out of it.
///
/// Every applied move recomputes `on_slope` from the cell the rabbit ends
/// up in, so leaving a slope takes away its support.

use crate::error::SaveError;

use super::behaviour::{Behaviour, Changes, SaveState};
use super::entity::{Direction, Rabbit};
use super::state::State;
use super::terrain::Terrain;

#[derive(Clone, Debug, Default)]
pub struct Walking;

impl Walking {
    pub fn new() -> Self {
        Walking
    }

    fn start_rise(rabbit: &Rabbit, terrain: &Terrain) -> bool {
        rise_block_at(rabbit.dest(), rabbit, terrain)
    }

    fn finish_rise(rabbit: &Rabbit, terrain: &Terrain) -> bool {
        rise_block_at(rabbit.x, rabbit, terrain)
    }

    fn turn(rabbit: &Rabbit, terrain: &Terrain) -> bool {
        terrain.square_block_at(rabbit.dest(), rabbit.y)
    }
}

fn rise_block_at(x: i32, rabbit: &Rabbit, terrain: &Terrain) -> bool {
    terrain
        .block_at(x, rabbit.y)
        .is_some_and(|b| b.rise_dir() == Some(rabbit.dir))
}

impl Behaviour for Walking {
    fn name(&self) -> &'static str {
        "Walking"
    }

    fn new_state(&self, rabbit: &Rabbit, terrain: &Terrain) -> Option<State> {
        let state = if Self::start_rise(rabbit, terrain) {
            rabbit.rl(State::RisingRight1, State::RisingLeft1)
        } else if Self::finish_rise(rabbit, terrain) {
            rabbit.rl(State::RisingRight2, State::RisingLeft2)
        } else if Self::turn(rabbit, terrain) {
            rabbit.rl(State::TurningRightToLeft, State::TurningLeftToRight)
        } else {
            rabbit.rl(State::WalkingRight, State::WalkingLeft)
        };
        Some(state)
    }

    fn behave(
        &mut self,
        terrain: &Terrain,
        _changes: &mut Changes,
        rabbit: &mut Rabbit,
        state: State,
    ) -> bool {
        match state {
            State::RisingLeft1 | State::WalkingLeft => rabbit.x -= 1,
            State::RisingRight1 | State::WalkingRight => rabbit.x += 1,
            State::RisingLeft2 => {
                rabbit.x -= 1;
                rabbit.y -= 1;
            }
            State::RisingRight2 => {
                rabbit.x += 1;
                rabbit.y -= 1;
            }
            State::TurningLeftToRight => rabbit.dir = Direction::Right,
            State::TurningRightToLeft => rabbit.dir = Direction::Left,
            _ => return false,
        }
        rabbit.on_slope = terrain
            .block_at(rabbit.x, rabbit.y)
            .is_some_and(|b| b.is_slope());
        true
    }

    fn save_state(&self, _saved: &mut SaveState) {}

    fn restore_from_state(&mut self, _saved: &SaveState) -> Result<(), SaveError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::Owner;

    fn rabbit_at(x: i32, y: i32, dir: Direction) -> Rabbit {
        Rabbit::new(0, x, y, dir)
    }

    fn apply(rabbit: &mut Rabbit, terrain: &Terrain, state: State) -> bool {
        Walking::new().behave(terrain, &mut Changes::default(), rabbit, state)
    }

    // ── new_state ──

    #[test]
    fn walks_on_open_ground() {
        let t = Terrain::from_rows(&["   ", "###"]);
        let w = Walking::new();
        assert_eq!(w.new_state(&rabbit_at(1, 0, Direction::Right), &t), Some(State::WalkingRight));
        assert_eq!(w.new_state(&rabbit_at(1, 0, Direction::Left), &t), Some(State::WalkingLeft));
    }

    #[test]
    fn turns_at_wall() {
        // Rabbit at (5,10) facing right, floor at (5,11), wall at (6,10).
        let mut rows = vec!["        "; 10];
        rows.push("      # ");
        rows.push("########");
        let t = Terrain::from_rows(&rows);
        let mut r = rabbit_at(5, 10, Direction::Right);
        assert!(t.flat_block_at(5, 11));

        let state = Walking::new().new_state(&r, &t);
        assert_eq!(state, Some(State::TurningRightToLeft));

        assert!(apply(&mut r, &t, State::TurningRightToLeft));
        assert_eq!(r.dir, Direction::Left);
        assert_eq!((r.x, r.y), (5, 10));
    }

    #[test]
    fn turns_left_to_right_at_wall() {
        let t = Terrain::from_rows(&["#  ", "###"]);
        let r = rabbit_at(1, 0, Direction::Left);
        assert_eq!(Walking::new().new_state(&r, &t), Some(State::TurningLeftToRight));
    }

    #[test]
    fn starts_rising_onto_matching_slope() {
        let t = Terrain::from_rows(&["  /#", "####"]);
        let r = rabbit_at(1, 0, Direction::Right);
        assert_eq!(Walking::new().new_state(&r, &t), Some(State::RisingRight1));

        let t = Terrain::from_rows(&["#\\  ", "####"]);
        let r = rabbit_at(2, 0, Direction::Left);
        assert_eq!(Walking::new().new_state(&r, &t), Some(State::RisingLeft1));
    }

    #[test]
    fn finishes_rising_inside_slope() {
        let t = Terrain::from_rows(&["  /#", "####"]);
        let r = rabbit_at(2, 0, Direction::Right);
        assert_eq!(Walking::new().new_state(&r, &t), Some(State::RisingRight2));
    }

    #[test]
    fn bridge_counts_as_slope() {
        let t = Terrain::from_rows(&["  (#", "####"]);
        let r = rabbit_at(1, 0, Direction::Right);
        assert_eq!(Walking::new().new_state(&r, &t), Some(State::RisingRight1));
    }

    #[test]
    fn never_rises_against_the_slope() {
        // Slope rising left, rabbit walking right into it.
        let t = Terrain::from_rows(&["  \\ ", "####"]);
        let w = Walking::new();
        for x in 0..4 {
            let r = rabbit_at(x, 0, Direction::Right);
            let state = w.new_state(&r, &t).unwrap();
            assert!(
                !matches!(state, State::RisingRight1 | State::RisingRight2
                    | State::RisingLeft1 | State::RisingLeft2),
                "x={x} proposed {state}"
            );
        }
    }

    #[test]
    fn always_proposes_a_walking_state() {
        let t = Terrain::from_rows(&["#/\\(#", "#####"]);
        let w = Walking::new();
        for x in 0..5 {
            for dir in [Direction::Left, Direction::Right] {
                let state = w.new_state(&rabbit_at(x, 0, dir), &t).unwrap();
                assert_eq!(state.owner(), Owner::Walking);
            }
        }
    }

    // ── behave ──

    #[test]
    fn walking_moves_one_column() {
        let t = Terrain::new(4, 4);
        let mut r = rabbit_at(2, 2, Direction::Right);
        assert!(apply(&mut r, &t, State::WalkingRight));
        assert_eq!((r.x, r.y), (3, 2));
        assert!(apply(&mut r, &t, State::WalkingLeft));
        assert_eq!((r.x, r.y), (2, 2));
    }

    #[test]
    fn rising_first_frame_is_horizontal() {
        let t = Terrain::new(4, 4);
        let mut r = rabbit_at(2, 2, Direction::Left);
        assert!(apply(&mut r, &t, State::RisingLeft1));
        assert_eq!((r.x, r.y), (1, 2));
    }

    #[test]
    fn rising_second_frame_steps_up_once() {
        let t = Terrain::new(4, 4);
        let mut r = rabbit_at(1, 2, Direction::Right);
        assert!(apply(&mut r, &t, State::RisingRight2));
        assert_eq!((r.x, r.y), (2, 1));

        let mut r = rabbit_at(1, 2, Direction::Left);
        assert!(apply(&mut r, &t, State::RisingLeft2));
        assert_eq!((r.x, r.y), (0, 1));
    }

    #[test]
    fn rising_tracks_slope_cell() {
        let t = Terrain::from_rows(&["    ", "  /#", "####"]);
        let mut r = rabbit_at(1, 1, Direction::Right);
        assert!(apply(&mut r, &t, State::RisingRight1));
        assert_eq!((r.x, r.y), (2, 1));
        assert!(r.on_slope);

        assert!(apply(&mut r, &t, State::RisingRight2));
        assert_eq!((r.x, r.y), (3, 0));
        assert!(!r.on_slope);
    }

    #[test]
    fn walking_off_a_slope_clears_flag() {
        let t = Terrain::from_rows(&[r"  \  ", "#####"]);
        let mut r = rabbit_at(2, 0, Direction::Right);
        r.on_slope = true;
        assert!(apply(&mut r, &t, State::WalkingRight));
        assert_eq!((r.x, r.y), (3, 0));
        assert!(!r.on_slope);
    }

    #[test]
    fn turning_keeps_position() {
        let t = Terrain::new(4, 4);
        let mut r = rabbit_at(1, 1, Direction::Left);
        assert!(apply(&mut r, &t, State::TurningLeftToRight));
        assert_eq!(r.dir, Direction::Right);
        assert_eq!((r.x, r.y), (1, 1));
    }

    #[test]
    fn foreign_states_are_not_handled() {
        let t = Terrain::new(4, 4);
        for state in State::ALL.iter().filter(|s| s.owner() != Owner::Walking) {
            let mut r = rabbit_at(1, 1, Direction::Right);
            let before = r.clone();
            assert!(!apply(&mut r, &t, *state), "{state}");
            assert_eq!(r, before);
        }
    }

    #[test]
    fn save_state_is_empty() {
        let mut saved = SaveState::new();
        Walking::new().save_state(&mut saved);
        assert!(saved.is_empty());
    }
}
