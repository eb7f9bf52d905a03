/// Entry point and tick loop.

mod ui;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info};

use rabbitrun::config::GameConfig;
use rabbitrun::logging;
use rabbitrun::sim::event::GameEvent;
use rabbitrun::sim::level::{level_names, load_embedded, load_level_file, render_ascii};
use rabbitrun::sim::save;
use rabbitrun::sim::step::step;
use rabbitrun::sim::world::World;
use ui::input::{drain_commands, Command};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(name = "rabbitrun", about = "Watch rabbits walk, climb and fall over block terrain")]
struct Cli {
    /// Level file, a file name in the levels directory, or a built-in level number.
    level: Option<String>,

    /// Number of ticks to run (default from config).
    #[arg(long)]
    ticks: Option<u64>,

    /// Print ASCII frames to stdout instead of drawing in the terminal.
    #[arg(long)]
    plain: bool,

    /// Write a save file when the run ends.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// Continue from a save file instead of loading a level.
    #[arg(long, value_name = "PATH", conflicts_with = "level")]
    resume: Option<PathBuf>,

    /// Explicit config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// List available levels and exit.
    #[arg(long)]
    list: bool,

    /// Log every state change.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("rabbitrun: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = GameConfig::load(cli.config.as_deref());

    if cli.list {
        for (i, name) in level_names(&config.levels_dir).iter().enumerate() {
            println!("{i:>3}  {name}");
        }
        return Ok(());
    }

    let mut world = match (&cli.resume, &cli.level) {
        (Some(path), _) => save::load_from(path)
            .with_context(|| format!("resuming from {}", path.display()))?,
        (None, Some(level)) => open_level(level, &config.levels_dir)?,
        (None, None) => bail!("no level given (try --list)"),
    };
    info!("level {:?}: {} rabbits", world.name, world.num_rabbits());

    let ticks = cli.ticks.unwrap_or(config.sim.max_ticks);
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    let result = if cli.plain {
        run_plain(&mut world, ticks)
    } else {
        run_terminal(&mut world, ticks, tick_rate)
    };

    // Save even after an engine error so the failing state can be inspected.
    if let Some(path) = &cli.save {
        save::save_to(path, &world)
            .with_context(|| format!("writing save to {}", path.display()))?;
        info!("saved tick {} to {}", world.tick, path.display());
    }

    result
}

/// Resolve a level argument: existing path, then levels dir, then built-in index.
fn open_level(arg: &str, levels_dir: &Path) -> anyhow::Result<World> {
    let direct = PathBuf::from(arg);
    if direct.is_file() {
        return load_level_file(&direct).with_context(|| format!("loading {arg}"));
    }

    let in_dir = levels_dir.join(arg);
    let candidates = [in_dir.clone(), in_dir.with_extension("txt")];
    if let Some(path) = candidates.iter().find(|p| p.is_file()) {
        return load_level_file(path).with_context(|| format!("loading {}", path.display()));
    }

    if let Ok(idx) = arg.parse::<usize>() {
        if let Some(world) = load_embedded(idx) {
            return world.with_context(|| format!("loading built-in level {idx}"));
        }
    }

    bail!("level {arg:?} not found (try --list)")
}

fn run_plain(world: &mut World, ticks: u64) -> anyhow::Result<()> {
    print_frame(world);
    for _ in 0..ticks {
        let events = step(world)?;
        print_frame(world);
        report_events(&events);
        if world.num_rabbits() == 0 {
            break;
        }
    }
    Ok(())
}

fn print_frame(world: &World) {
    println!("-- tick {} --", world.tick);
    for row in render_ascii(world) {
        println!("{}", row.trim_end());
    }
}

fn report_events(events: &[GameEvent]) {
    for e in events {
        match e {
            GameEvent::RabbitKilled { id, x, y, state } => {
                println!("rabbit {id} died ({state}) at ({x}, {y})");
            }
            GameEvent::AllRabbitsGone => println!("no rabbits left"),
        }
    }
}

fn run_terminal(world: &mut World, ticks: u64, tick_rate: Duration) -> anyhow::Result<()> {
    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let result = tick_loop(world, &mut renderer, ticks, tick_rate);

    if let Err(e) = renderer.cleanup() {
        error!("terminal cleanup failed: {e}");
    }
    result
}

fn tick_loop(
    world: &mut World,
    renderer: &mut Renderer,
    ticks: u64,
    tick_rate: Duration,
) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();
    let mut remaining = ticks;
    let mut paused = false;
    let mut message = String::from("[p] pause  [n] step  [q] quit");

    loop {
        let mut advance = false;
        for cmd in drain_commands() {
            match cmd {
                Command::Quit => return Ok(()),
                Command::TogglePause => paused = !paused,
                Command::Step => advance = paused,
            }
        }

        let due = !paused && last_tick.elapsed() >= tick_rate;
        if remaining > 0 && world.num_rabbits() > 0 && (due || advance) {
            for e in step(world)? {
                message = match e {
                    GameEvent::RabbitKilled { id, state, .. } => format!("rabbit {id} died ({state})"),
                    GameEvent::AllRabbitsGone => "no rabbits left  [q] quit".to_string(),
                };
            }
            remaining -= 1;
            last_tick = Instant::now();
            if remaining == 0 {
                message = "out of ticks  [q] quit".to_string();
            }
        }

        renderer.render(world, &message)?;
        thread::sleep(FRAME_SLEEP);
    }
}
