/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame from a `Snapshot` into `front`
///   2. Compare each cell with `back` (previous frame)
///   3. Only emit terminal commands for cells that changed, batched with `queue!`
///   4. Swap front/back
///
/// Each tile is two terminal columns wide and one row high.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use cinderpath::domain::tile::{Tile, TilePos};
use cinderpath::sim::snapshot::{Snapshot, Sprite};

// ── Cell ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never equal to a composed cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    /// Two-column glyph for one tile.
    fn put_tile(&mut self, tile: TilePos, glyph: [char; 2], fg: Color, bg: Color) {
        if tile.x < 0 || tile.y < 0 {
            return;
        }
        let col = MAP_COL + tile.x as usize * CELL_W;
        let row = MAP_ROW + tile.y as usize;
        self.set(col, row, Cell { ch: glyph[0], fg, bg });
        self.set(col + 1, row, Cell { ch: glyph[1], fg, bg });
    }
}

// ── Layout ──

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 1;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const FLOOR_BG: Color = Color::Rgb { r: 30, g: 34, b: 30 };
const HELP: &str = " Move:Arrows/WASD  [1]Place [2]Burn [Tab]Toggle  Click:act  [C]lear  [R]eload  [Q]uit";

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the
    /// terminal will report key Release events.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        self.sync_size(terminal::size().unwrap_or((80, 24)));
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Map a terminal cell to the tile drawn there.
    pub fn screen_to_tile(&self, column: u16, row: u16) -> Option<TilePos> {
        let (column, row) = (column as usize, row as usize);
        if column < MAP_COL || row < MAP_ROW {
            return None;
        }
        Some(TilePos::new(
            ((column - MAP_COL) / CELL_W) as i32,
            (row - MAP_ROW) as i32,
        ))
    }

    pub fn render(&mut self, snap: &Snapshot<'_>, status: &str) -> io::Result<()> {
        let size = terminal::size().unwrap_or((80, 24));
        if size.0 as usize != self.term_w || size.1 as usize != self.term_h {
            self.sync_size(size);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.cells.fill(Cell::BLANK);
        self.compose(snap, status);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn sync_size(&mut self, (tw, th): (u16, u16)) {
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
    }

    // ── Compose ──

    fn compose(&mut self, snap: &Snapshot<'_>, status: &str) {
        let hud = &snap.hud;
        let line = format!(
            " L{} {:<16} Items:{:<3} Mode:{:<5} Berries:{} ",
            hud.level + 1,
            hud.level_name,
            hud.allowance,
            hud.mode.label(),
            hud.berries,
        );
        for x in 0..self.front.width {
            self.front.set(x, HUD_ROW, Cell { ch: ' ', fg: Color::White, bg: HUD_BG });
        }
        self.front.put_str(0, HUD_ROW, &line, Color::White, HUD_BG);

        for (y, row) in snap.grid.rows().iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let pos = TilePos::new(x as i32, y as i32);
                match tile {
                    Tile::Solid => self.front.put_tile(pos, ['█', '█'], Color::DarkGrey, Cell::BASE_BG),
                    Tile::Walkable => self.front.put_tile(pos, ['·', ' '], Color::Rgb { r: 60, g: 70, b: 60 }, FLOOR_BG),
                }
            }
        }

        for view in &snap.sprites {
            let (glyph, fg) = sprite_glyph(view.sprite, view.angle);
            self.front.put_tile(view.tile(), glyph, fg, FLOOR_BG);
        }

        let status_row = MAP_ROW + snap.grid.height() + 1;
        self.front.put_str(1, status_row, status, Color::Yellow, Cell::BASE_BG);
        self.front.put_str(0, status_row + 1, HELP, Color::DarkGrey, Cell::BASE_BG);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

/// Two-column glyph and color for a sprite. Facing only matters for
/// actors, which show an arrow.
fn sprite_glyph(sprite: Sprite, angle: f32) -> ([char; 2], Color) {
    let arrow = match angle as i32 {
        0 => '^',
        90 => '>',
        180 => 'v',
        _ => '<',
    };
    match sprite {
        Sprite::Player => (['@', arrow], Color::Cyan),
        Sprite::Enemy => (['E', arrow], Color::Red),
        Sprite::DeadEnemy => (['x', 'x'], Color::DarkRed),
        Sprite::Item => (['#', '#'], Color::Rgb { r: 150, g: 110, b: 60 }),
        Sprite::Flame => (['^', '^'], Color::Rgb { r: 255, g: 120, b: 20 }),
        Sprite::Portal => (['(', ')'], Color::Magenta),
        Sprite::Berry => (['o', '*'], Color::Rgb { r: 200, g: 40, b: 120 }),
        Sprite::Pebble => (['O', 'O'], Color::Grey),
    }
}
