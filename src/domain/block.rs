/// Block types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so block semantics are centralized here.

use super::entity::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockKind {
    SolidFlat,
    SolidUpRight,  // `/`  climbs towards the right
    SolidUpLeft,   // `\`  climbs towards the left
    BridgeUpRight, // built by a rabbit, walks like a slope
    BridgeUpLeft,
}

/// One terrain cell. Copied out of the grid on every query.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Block {
    pub kind: BlockKind,
}

impl Block {
    pub const FLAT: Block = Block { kind: BlockKind::SolidFlat };

    pub fn new(kind: BlockKind) -> Self {
        Block { kind }
    }

    /// Direction a rabbit walking up this block travels in.
    /// `None` for flat blocks.
    pub fn rise_dir(self) -> Option<Direction> {
        match self.kind {
            BlockKind::SolidFlat => None,
            BlockKind::SolidUpRight | BlockKind::BridgeUpRight => Some(Direction::Right),
            BlockKind::SolidUpLeft | BlockKind::BridgeUpLeft => Some(Direction::Left),
        }
    }

    pub fn is_flat(self) -> bool {
        self.kind == BlockKind::SolidFlat
    }

    pub fn is_slope(self) -> bool {
        !self.is_flat()
    }

    pub fn to_char(self) -> char {
        match self.kind {
            BlockKind::SolidFlat     => '#',
            BlockKind::SolidUpRight  => '/',
            BlockKind::SolidUpLeft   => '\\',
            BlockKind::BridgeUpRight => '(',
            BlockKind::BridgeUpLeft  => ')',
        }
    }

    /// Inverse of `to_char`. Empty cells and rabbits are not blocks.
    pub fn from_char(c: char) -> Option<Block> {
        let kind = match c {
            '#'  => BlockKind::SolidFlat,
            '/'  => BlockKind::SolidUpRight,
            '\\' => BlockKind::SolidUpLeft,
            '('  => BlockKind::BridgeUpRight,
            ')'  => BlockKind::BridgeUpLeft,
            _    => return None,
        };
        Some(Block { kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_block_has_no_rise() {
        assert_eq!(Block::FLAT.rise_dir(), None);
        assert!(Block::FLAT.is_flat());
    }

    #[test]
    fn slopes_rise_towards_their_side() {
        assert_eq!(Block::new(BlockKind::SolidUpRight).rise_dir(), Some(Direction::Right));
        assert_eq!(Block::new(BlockKind::BridgeUpRight).rise_dir(), Some(Direction::Right));
        assert_eq!(Block::new(BlockKind::SolidUpLeft).rise_dir(), Some(Direction::Left));
        assert_eq!(Block::new(BlockKind::BridgeUpLeft).rise_dir(), Some(Direction::Left));
    }

    #[test]
    fn chars_map_back_to_blocks() {
        for c in ['#', '/', '\\', '(', ')'] {
            let block = Block::from_char(c).unwrap();
            assert_eq!(block.to_char(), c);
        }
        assert_eq!(Block::from_char(' '), None);
        assert_eq!(Block::from_char('r'), None);
    }
}
