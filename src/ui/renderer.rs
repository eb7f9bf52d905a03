/// Terminal view of a running world.
///
/// Each frame is composed as rows of colored glyphs: the HUD line, a
/// blank line, the map, a blank line and the message line. Only rows that
/// differ from the previous frame are rewritten, and all commands are
/// batched with `queue!` and flushed once.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use rabbitrun::domain::block::{Block, BlockKind};
use rabbitrun::domain::entity::Rabbit;
use rabbitrun::domain::state::Owner;
use rabbitrun::sim::world::World;

const BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

type Glyph = (char, Color);
type Row = Vec<Glyph>;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    /// Last frame drawn. `None` forces a full repaint.
    shown: Option<Vec<Row>>,
    size: (u16, u16),
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::new(io::stdout()),
            shown: None,
            size: (0, 0),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.writer, terminal::EnterAlternateScreen, cursor::Hide)?;
        self.size = terminal::size().unwrap_or((80, 24));
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Draw one frame. `message` goes on the line under the map.
    pub fn render(&mut self, world: &World, message: &str) -> io::Result<()> {
        let size = terminal::size().unwrap_or((80, 24));
        if size != self.size || self.shown.is_none() {
            self.size = size;
            self.shown = None;
            queue!(self.writer, SetBackgroundColor(BG), Clear(ClearType::All))?;
        }

        let frame = compose(world, message, self.size.0 as usize);
        let previous = self.shown.take().unwrap_or_default();

        for (y, row) in frame.iter().enumerate().take(self.size.1 as usize) {
            if previous.get(y) != Some(row) {
                self.draw_row(y, row)?;
            }
        }
        self.writer.flush()?;

        self.shown = Some(frame);
        Ok(())
    }

    /// Rewrite a whole line, switching color only between runs.
    fn draw_row(&mut self, y: usize, row: &[Glyph]) -> io::Result<()> {
        queue!(self.writer, MoveTo(0, y as u16), SetBackgroundColor(BG))?;
        let mut current = None;
        for &(ch, fg) in row {
            if current != Some(fg) {
                queue!(self.writer, SetForegroundColor(fg))?;
                current = Some(fg);
            }
            queue!(self.writer, Print(ch))?;
        }
        queue!(self.writer, Clear(ClearType::UntilNewLine))
    }
}

fn compose(w: &World, message: &str, width: usize) -> Vec<Row> {
    let text = |s: &str, fg: Color| -> Row { s.chars().take(width).map(|c| (c, fg)).collect() };

    let hud = format!(" {}   tick {}   rabbits {}", w.name, w.tick, w.num_rabbits());
    let mut rows = vec![text(&hud, Color::Cyan), Row::new()];

    let mut map: Vec<Row> = (0..w.terrain.height())
        .map(|y| {
            (0..w.terrain.width().min(width))
                .map(|x| match w.terrain.block_at(x as i32, y as i32) {
                    Some(block) => block_glyph(block),
                    None => (' ', Color::White),
                })
                .collect()
        })
        .collect();

    for r in w.rabbits() {
        let (Ok(x), Ok(y)) = (usize::try_from(r.x), usize::try_from(r.y)) else { continue };
        if let Some(cell) = map.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = rabbit_glyph(r);
        }
    }

    rows.extend(map);
    rows.push(Row::new());
    rows.push(text(message, Color::Grey));
    rows
}

fn block_glyph(block: Block) -> Glyph {
    let fg = match block.kind {
        BlockKind::SolidFlat => Color::DarkYellow,
        BlockKind::SolidUpRight | BlockKind::SolidUpLeft => Color::Green,
        BlockKind::BridgeUpRight | BlockKind::BridgeUpLeft => Color::DarkCyan,
    };
    (block.to_char(), fg)
}

fn rabbit_glyph(r: &Rabbit) -> Glyph {
    let fg = if r.state.is_dying() {
        Color::Red
    } else {
        match r.state.owner() {
            Owner::Falling => Color::Yellow,
            Owner::Walking => Color::White,
            Owner::External => Color::DarkGrey,
        }
    };
    (r.rl('r', 'j'), fg)
}
