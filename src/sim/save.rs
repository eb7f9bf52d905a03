/// Save and load a running world as a key=value snapshot.
///
/// ## File format:
///   ```text
///   name=Burrow 2 - Mind the Gap
///   tick=12
///   block_row=##......         (one per terrain row, '.' = empty)
///   rabbit=0,6,2,R,FALLING,0,0 (id,x,y,dir,state,on_slope,climbing)
///   behaviour=0,Falling.heightFallen,2
///   ```
///
/// `behaviour=` lines carry each rabbit's behaviour counters. Only
/// non-default counters are written, so a settled rabbit has none.
/// A counter whose value does not parse is reset to its default and
/// logged; every other malformed line is an error.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;

use crate::domain::behaviour::SaveState;
use crate::domain::block::Block;
use crate::domain::entity::{Direction, Rabbit};
use crate::domain::state::State;
use crate::domain::terrain::Terrain;
use crate::error::SaveError;
use crate::sim::world::{Actor, World};

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub tick: u64,
    pub block_rows: Vec<String>,
    pub rabbits: Vec<SnapshotRabbit>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotRabbit {
    pub rabbit: Rabbit,
    pub behaviours: SaveState,
}

// ══════════════════════════════════════════════════════════════
// Snapshot capture / restore (World ↔ Snapshot)
// ══════════════════════════════════════════════════════════════

pub fn capture_snapshot(w: &World) -> Snapshot {
    Snapshot {
        name: w.name.clone(),
        tick: w.tick,
        block_rows: w.terrain.rows(),
        rabbits: w.actors.iter().map(|a| {
            let mut behaviours = SaveState::new();
            a.behaviours.save_state(&mut behaviours);
            SnapshotRabbit { rabbit: a.rabbit.clone(), behaviours }
        }).collect(),
    }
}

/// Rebuild a world. Malformed behaviour counters are logged and reset.
pub fn restore_snapshot(snap: &Snapshot) -> World {
    let rows: Vec<&str> = snap.block_rows.iter().map(String::as_str).collect();
    let mut world = World::new(&snap.name, Terrain::from_rows(&rows));
    world.tick = snap.tick;

    for s in &snap.rabbits {
        let mut actor = Actor::new(s.rabbit.clone());
        for e in actor.behaviours.restore_from_state(&s.behaviours) {
            warn!("rabbit {}: {e}; using default", s.rabbit.id);
        }
        world.actors.push(actor);
    }

    world
}

// ══════════════════════════════════════════════════════════════
// Files
// ══════════════════════════════════════════════════════════════

pub fn save_to(path: &Path, world: &World) -> Result<(), SaveError> {
    let content = serialize(&capture_snapshot(world));
    std::fs::write(path, content).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_from(path: &Path) -> Result<World, SaveError> {
    let content = std::fs::read_to_string(path).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(restore_snapshot(&parse_save(&content)?))
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn bool_str(b: bool) -> &'static str {
    if b { "1" } else { "0" }
}

pub fn serialize(snap: &Snapshot) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!("name={}\n", snap.name));
    out.push_str(&format!("tick={}\n", snap.tick));

    for row in &snap.block_rows {
        let s: String = row.chars().map(|c| if c == ' ' { '.' } else { c }).collect();
        out.push_str(&format!("block_row={}\n", s));
    }

    for s in &snap.rabbits {
        let r = &s.rabbit;
        out.push_str(&format!("rabbit={},{},{},{},{},{},{}\n",
            r.id, r.x, r.y, r.dir.as_str(), r.state.name(),
            bool_str(r.on_slope), bool_str(r.climbing_active)));
    }

    for s in &snap.rabbits {
        for (key, value) in &s.behaviours {
            out.push_str(&format!("behaviour={},{},{}\n", s.rabbit.id, key, value));
        }
    }

    out
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_save(content: &str) -> Result<Snapshot, SaveError> {
    let mut name = String::new();
    let mut tick: u64 = 0;
    let mut block_rows: Vec<String> = vec![];
    let mut rabbits: Vec<Rabbit> = vec![];
    let mut behaviours: BTreeMap<usize, SaveState> = BTreeMap::new();

    for (n, line) in content.lines().enumerate() {
        let line_no = n + 1;
        let line = line.trim_end();

        if line.is_empty() {
            continue;
        } else if let Some(val) = line.strip_prefix("name=") {
            name = val.to_string();
        } else if let Some(val) = line.strip_prefix("tick=") {
            tick = val.trim().parse().map_err(|_| malformed(line_no, "tick is not a number"))?;
        } else if let Some(val) = line.strip_prefix("block_row=") {
            block_rows.push(parse_block_row(val, line_no)?);
        } else if let Some(val) = line.strip_prefix("rabbit=") {
            rabbits.push(parse_rabbit(val, line_no)?);
        } else if let Some(val) = line.strip_prefix("behaviour=") {
            let (id, key, value) = parse_behaviour(val, line_no)?;
            behaviours.entry(id).or_default().insert(key, value);
        } else {
            return Err(malformed(line_no, "unknown key"));
        }
    }

    if block_rows.is_empty() {
        return Err(SaveError::MissingTerrain);
    }

    let rabbits: Vec<SnapshotRabbit> = rabbits.into_iter().map(|rabbit| SnapshotRabbit {
        behaviours: behaviours.remove(&rabbit.id).unwrap_or_default(),
        rabbit,
    }).collect();

    for id in behaviours.keys() {
        warn!("behaviour state for unknown rabbit {id} ignored");
    }

    Ok(Snapshot { name, tick, block_rows, rabbits })
}

fn malformed(line: usize, reason: &str) -> SaveError {
    SaveError::MalformedLine { line, reason: reason.to_string() }
}

fn parse_block_row(val: &str, line: usize) -> Result<String, SaveError> {
    val.chars().map(|c| match c {
        '.' => Ok(' '),
        _ if Block::from_char(c).is_some() => Ok(c),
        _ => Err(malformed(line, &format!("unknown block char {c:?}"))),
    }).collect()
}

fn parse_rabbit(val: &str, line: usize) -> Result<Rabbit, SaveError> {
    let p: Vec<&str> = val.split(',').map(str::trim).collect();
    let [id, x, y, dir, state, on_slope, climbing] = p.as_slice() else {
        return Err(malformed(line, "rabbit needs 7 fields"));
    };
    let state = State::from_name(state).ok_or_else(|| SaveError::UnknownState {
        line,
        name: state.to_string(),
    })?;
    Ok(Rabbit {
        id: id.parse().map_err(|_| malformed(line, "bad rabbit id"))?,
        x: x.parse().map_err(|_| malformed(line, "bad x"))?,
        y: y.parse().map_err(|_| malformed(line, "bad y"))?,
        dir: Direction::parse(dir).ok_or_else(|| malformed(line, "bad direction"))?,
        state,
        on_slope: *on_slope == "1",
        climbing_active: *climbing == "1",
    })
}

fn parse_behaviour(val: &str, line: usize) -> Result<(usize, String, String), SaveError> {
    let mut p = val.splitn(3, ',');
    let (Some(id), Some(key), Some(value)) = (p.next(), p.next(), p.next()) else {
        return Err(malformed(line, "behaviour needs id,key,value"));
    };
    let id = id.trim().parse().map_err(|_| malformed(line, "bad rabbit id"))?;
    Ok((id, key.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::parse_level;
    use crate::sim::step::step;

    const GAP: &str = "# Gap\nr       \n##      \n        \n        \n        \n########\n";

    #[test]
    fn running_world_survives_a_round_trip() {
        let mut w = parse_level(GAP, "x").unwrap();
        step(&mut w).unwrap();
        step(&mut w).unwrap();
        step(&mut w).unwrap();
        let r = w.rabbit(0).unwrap().clone();
        assert_eq!(r.state, State::Falling);

        let text = serialize(&capture_snapshot(&w));
        assert!(text.contains("behaviour=0,Falling.heightFallen,2\n"));

        let snap = parse_save(&text).unwrap();
        assert_eq!(snap, capture_snapshot(&w));

        let mut restored = restore_snapshot(&snap);
        assert_eq!(restored.tick, 3);
        assert_eq!(restored.rabbit(0), Some(&r));

        // Both worlds carry on identically.
        for _ in 0..4 {
            let a = step(&mut w).unwrap();
            let b = step(&mut restored).unwrap();
            assert_eq!(a, b);
            assert_eq!(capture_snapshot(&w), capture_snapshot(&restored));
        }
    }

    #[test]
    fn settled_rabbit_writes_no_behaviour_lines() {
        let w = parse_level(GAP, "x").unwrap();
        let text = serialize(&capture_snapshot(&w));
        assert!(!text.contains("behaviour="));
        assert!(text.contains("rabbit=0,0,0,R,WALKING_RIGHT,0,0\n"));
        assert!(text.contains("block_row=##......\n"));
    }

    #[test]
    fn malformed_counter_restores_as_default() {
        let text = "tick=1\nblock_row=....\nblock_row=####\n\
                    rabbit=0,1,0,R,FALLING,0,0\nbehaviour=0,Falling.heightFallen,high\n";
        let snap = parse_save(text).unwrap();
        let w = restore_snapshot(&snap);
        let saved = capture_snapshot(&w);
        assert!(saved.rabbits[0].behaviours.is_empty());
    }

    #[test]
    fn unknown_state_is_rejected() {
        let text = "block_row=#\nrabbit=0,0,0,R,FLYING,0,0\n";
        assert!(matches!(
            parse_save(text),
            Err(SaveError::UnknownState { line: 2, ref name }) if name == "FLYING"
        ));
    }

    #[test]
    fn short_rabbit_line_is_rejected() {
        let text = "block_row=#\nrabbit=0,0,0\n";
        assert!(matches!(parse_save(text), Err(SaveError::MalformedLine { line: 2, .. })));
    }

    #[test]
    fn terrain_is_required() {
        assert!(matches!(parse_save("tick=4\n"), Err(SaveError::MissingTerrain)));
    }

    #[test]
    fn file_round_trip() {
        let w = parse_level(GAP, "x").unwrap();
        let path = std::env::temp_dir().join(format!("rabbitrun_save_{}.dat", std::process::id()));
        save_to(&path, &w).unwrap();
        let loaded = load_from(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(capture_snapshot(&loaded), capture_snapshot(&w));
    }
}
