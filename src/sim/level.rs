/// Level loader.
///
/// ## Sources:
///   1. A `.txt` level file named on the command line
///   2. `.txt` files in the configured levels directory
///   3. Built-in embedded levels
///
/// ## Level format (`.txt`):
///   Optional line 1: `# Level Name`
///   Lines: map rows
///
/// ## Legend:
///   '#' = Solid flat block       '/' = Slope rising right
///   '\' = Slope rising left      '(' = Bridge rising right
///   ')' = Bridge rising left     'r' = Rabbit facing right
///   'j' = Rabbit facing left     ' ' or '.' = Empty

use std::path::{Path, PathBuf};

use log::debug;

use crate::domain::block::Block;
use crate::domain::entity::{Direction, Rabbit};
use crate::domain::terrain::Terrain;
use crate::error::LevelError;
use crate::sim::world::World;

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read and parse a level file. The file stem names unnamed levels.
pub fn load_level_file(path: &Path) -> Result<World, LevelError> {
    let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fallback = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let world = parse_level(&content, &fallback)?;
    debug!(
        "loaded level {:?} from {} ({}x{}, {} rabbits)",
        world.name,
        path.display(),
        world.terrain.width(),
        world.terrain.height(),
        world.num_rabbits()
    );
    Ok(world)
}

/// Parse a level from text. Rabbits get ids in reading order.
pub fn parse_level(content: &str, fallback_name: &str) -> Result<World, LevelError> {
    let mut name = String::new();
    // (file line number, row text)
    let mut rows: Vec<(usize, &str)> = vec![];

    for (n, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.starts_with('#') && name.is_empty() && rows.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push((n + 1, line));
        }
    }

    while rows.last().is_some_and(|(_, r)| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(LevelError::Empty);
    }
    if name.is_empty() {
        name = fallback_name.to_string();
    }

    let width = rows.iter().map(|(_, r)| r.chars().count()).max().unwrap_or(0);
    let mut terrain = Terrain::new(width, rows.len());
    let mut rabbits = vec![];

    for (y, (line, row)) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            let (cx, cy) = (x as i32, y as i32);
            match ch {
                ' ' | '.' => {}
                'r' => rabbits.push((cx, cy, Direction::Right)),
                'j' => rabbits.push((cx, cy, Direction::Left)),
                _ => match Block::from_char(ch) {
                    Some(block) => terrain.set_block(cx, cy, Some(block)),
                    None => {
                        return Err(LevelError::UnknownChar { line: *line, column: x + 1, ch });
                    }
                },
            }
        }
    }

    let mut world = World::new(&name, terrain);
    for (id, (x, y, dir)) in rabbits.into_iter().enumerate() {
        world.add_rabbit(Rabbit::new(id, x, y, dir));
    }
    Ok(world)
}

/// Draw terrain with rabbits on top, one string per row.
pub fn render_ascii(world: &World) -> Vec<String> {
    let mut rows: Vec<Vec<char>> = world
        .terrain
        .rows()
        .iter()
        .map(|r| r.chars().collect())
        .collect();

    for r in world.rabbits() {
        let (Ok(x), Ok(y)) = (usize::try_from(r.x), usize::try_from(r.y)) else { continue };
        if let Some(cell) = rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = r.rl('r', 'j');
        }
    }

    rows.into_iter().map(|r| r.into_iter().collect()).collect()
}

/// Names of every level available: built-ins first, then the directory.
pub fn level_names(levels_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = embedded_levels().iter().map(|(n, _)| n.to_string()).collect();
    names.extend(level_files(levels_dir).iter().map(|p| p.display().to_string()));
    names
}

/// Load a built-in level by index. `None` past the last one.
pub fn load_embedded(idx: usize) -> Option<Result<World, LevelError>> {
    let (name, rows) = embedded_levels().into_iter().nth(idx)?;
    Some(parse_level(&rows.join("\n"), name))
}

/// Distinguish `# Level Name` from `#r  #` (level data).
/// A name line starts with `#` and holds a char no map row can.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| !is_level_char(c))
}

fn is_level_char(c: char) -> bool {
    matches!(c, ' ' | '.' | 'r' | 'j') || Block::from_char(c).is_some()
}

// ══════════════════════════════════════════════════════════════
// Directory listing (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn level_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "txt"))
        .collect();
    files.sort();
    files
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("Burrow 1 - Over the Hill", vec![
            "                    ",
            "                    ",
            "   r    /#\\         ",
            "####################",
        ]),
        ("Burrow 2 - Mind the Gap", vec![
            "r                   ",
            "######        ######",
            "                    ",
            "      #####         ",
            "                    ",
            "                    ",
            "                    ",
            "                    ",
            "####################",
        ]),
        ("Burrow 3 - Soft Landing", vec![
            "     j              ",
            "  #######           ",
            "                    ",
            "  /                 ",
            "###  \\      r       ",
            "####################",
        ]),
    ]
}
