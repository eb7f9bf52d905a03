/// Terrain grid, the single source of truth for block queries.
///
/// ## Queries
///
/// Behaviours only ever read terrain through three questions:
///   - `block_at`       : what block (if any) is in the cell
///   - `square_block_at`: would the cell stop a rabbit walking into it
///   - `flat_block_at`  : is the cell a flat surface a rabbit can stand on
///
/// Cells outside the grid answer as solid flat blocks, so the edge of the
/// map is a wall on the sides and a floor at the bottom.

use super::block::Block;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    width: usize,
    height: usize,
    /// `cells[y][x]`, `None` = empty.
    cells: Vec<Vec<Option<Block>>>,
}

impl Terrain {
    pub fn new(width: usize, height: usize) -> Self {
        Terrain {
            width,
            height,
            cells: vec![vec![None; width]; height],
        }
    }

    /// Build from rows of block chars (see `Block::from_char`).
    /// Any non-block char is an empty cell. Short rows are padded.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut terrain = Terrain::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                terrain.cells[y][x] = Block::from_char(ch);
            }
        }
        terrain
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        let (ux, uy) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (ux < self.width && uy < self.height).then_some((ux, uy))
    }

    #[inline]
    pub fn block_at(&self, x: i32, y: i32) -> Option<Block> {
        match self.index(x, y) {
            Some((ux, uy)) => self.cells[uy][ux],
            None => Some(Block::FLAT), // out of bounds = wall
        }
    }

    /// Does a squared-off block stop horizontal entry into (x, y)?
    #[inline]
    pub fn square_block_at(&self, x: i32, y: i32) -> bool {
        self.block_at(x, y).is_some_and(Block::is_flat)
    }

    /// Is (x, y) a flat surface to stand on?
    #[inline]
    pub fn flat_block_at(&self, x: i32, y: i32) -> bool {
        self.block_at(x, y).is_some_and(Block::is_flat)
    }

    /// Place or clear a block. Out-of-bounds writes are ignored.
    pub fn set_block(&mut self, x: i32, y: i32, block: Option<Block>) {
        if let Some((ux, uy)) = self.index(x, y) {
            self.cells[uy][ux] = block;
        }
    }

    /// Rows of block chars, empty cells as spaces.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.map_or(' ', Block::to_char)).collect())
            .collect()
    }
}
