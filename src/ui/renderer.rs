/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The stage (world coordinates, e.g. 320x480) is scaled into a
/// terminal viewport below a two-row HUD. Terminal cells are treated as
/// twice as tall as wide, so the stage keeps its aspect ratio.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::WorldConfig;
use crate::sim::world::{Phase, WorldState};

// ── Palette ──

const COLOR_PLATFORM: Color = Color::Rgb { r: 76, g: 175, b: 80 };
const COLOR_PLAYER: Color = Color::Rgb { r: 255, g: 111, b: 0 };
const COLOR_STAGE_BG: Color = Color::Rgb { r: 32, g: 32, b: 48 };
const COLOR_PANEL_BG: Color = Color::Rgb { r: 60, g: 24, b: 24 };
const COLOR_HUD: Color = Color::White;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// cleared screen and untouched cells always match.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any
    /// real cell, so every position gets diff'd on the next flush.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

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
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
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
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }

    fn fill(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, bg: Color) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.set(x, y, Cell { ch: ' ', fg: Color::White, bg });
            }
        }
    }
}

// ── Viewport: where the stage lands on the terminal ──

/// Rows reserved above the stage for the HUD.
const HUD_ROWS: usize = 2;

/// Terminal cells are roughly this many times taller than wide; the
/// stage is stretched horizontally by the same factor to compensate.
const CELL_ASPECT: f32 = 2.0;

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub origin_col: usize,
    pub origin_row: usize,
    pub cols: usize,
    pub rows: usize,
}

impl Viewport {
    pub const EMPTY: Viewport = Viewport { origin_col: 0, origin_row: 0, cols: 0, rows: 0 };

    fn fit(term_w: usize, term_h: usize, cfg: &WorldConfig) -> Viewport {
        let avail_rows = term_h.saturating_sub(HUD_ROWS).max(1);
        let avail_cols = term_w.max(1);

        let mut rows = avail_rows;
        let mut cols = ((rows as f32) * CELL_ASPECT * cfg.width / cfg.height).round() as usize;
        if cols > avail_cols {
            cols = avail_cols;
            rows = ((cols as f32) * cfg.height / (CELL_ASPECT * cfg.width)).round() as usize;
            rows = rows.clamp(1, avail_rows);
        }
        cols = cols.max(1);

        Viewport {
            origin_col: (term_w.saturating_sub(cols)) / 2,
            origin_row: HUD_ROWS,
            cols,
            rows,
        }
    }

    /// Map a terminal cell back to stage coordinates (cell center).
    /// None when the cell lies outside the stage area.
    pub fn cell_to_world(&self, col: u16, row: u16, cfg: &WorldConfig) -> Option<(f32, f32)> {
        if self.cols == 0 || self.rows == 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col < self.origin_col
            || col >= self.origin_col + self.cols
            || row < self.origin_row
            || row >= self.origin_row + self.rows
        {
            return None;
        }
        let wx = (col - self.origin_col) as f32 + 0.5;
        let wy = (row - self.origin_row) as f32 + 0.5;
        Some((
            wx * cfg.width / self.cols as f32,
            wy * cfg.height / self.rows as f32,
        ))
    }

    /// Column span covered by the world x-range [x0, x1].
    fn col_span(&self, x0: f32, x1: f32, cfg: &WorldConfig) -> (usize, usize) {
        let sx = self.cols as f32 / cfg.width;
        let c0 = (x0.max(0.0) * sx).floor() as usize;
        let c1 = ((x1.min(cfg.width) * sx).ceil() as usize).min(self.cols);
        (self.origin_col + c0, self.origin_col + c1.max(c0))
    }

    /// Row span covered by the world y-range [y0, y1], at least one row
    /// tall when the range is non-empty and on stage.
    fn row_span(&self, y0: f32, y1: f32, cfg: &WorldConfig) -> (usize, usize) {
        let sy = self.rows as f32 / cfg.height;
        let r0 = (y0.max(0.0) * sy).floor() as usize;
        let mut r1 = ((y1.min(cfg.height) * sy).ceil() as usize).min(self.rows);
        if y1 > 0.0 && y0 < cfg.height && r1 <= r0 {
            r1 = (r0 + 1).min(self.rows);
        }
        (self.origin_row + r0, self.origin_row + r1.max(r0))
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    view: Viewport,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            view: Viewport::EMPTY,
            last_phase: None,
        }
    }

    /// Stage placement from the most recent render. Used by the input
    /// adapter to map pointer cells back to stage coordinates.
    pub fn viewport(&self) -> Viewport {
        self.view
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.view = Viewport::fit(self.term_w, self.term_h, &world.cfg);

        // Phase change (game over entry, restart) → clean repaint. This
        // is also what shows/hides the end panel exactly once.
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose_hud(world);
        self.compose_stage(world);
        if world.phase == Phase::GameOver {
            self.compose_end_panel(world);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, world: &WorldState) {
        let x = self.view.origin_col;
        self.front.put_str(
            x, 0,
            &format!("Score: {}", world.score),
            COLOR_HUD, Cell::BASE_BG,
        );
        self.front.put_str(
            x, 1,
            &format!("Goal: {}", world.cfg.win_threshold),
            COLOR_HUD, Cell::BASE_BG,
        );
    }

    fn compose_stage(&mut self, world: &WorldState) {
        let cfg = world.cfg;
        let v = self.view;

        // Stage background
        self.front.fill(
            v.origin_col, v.origin_row,
            v.origin_col + v.cols, v.origin_row + v.rows,
            COLOR_STAGE_BG,
        );

        // Platforms: two slabs per platform, left and right of the gap
        for plat in world.stream.iter() {
            let (r0, r1) = v.row_span(plat.y, plat.y + cfg.platform_height, &cfg);
            if r1 <= r0 {
                continue;
            }
            let (l0, l1) = v.col_span(0.0, plat.gap_x, &cfg);
            let (g1, rr) = v.col_span(plat.gap_x + plat.gap_width, cfg.width, &cfg);
            self.front.fill(l0, r0, l1, r1, COLOR_PLATFORM);
            self.front.fill(g1, r0, rr, r1, COLOR_PLATFORM);
        }

        // Player
        let p = world.player;
        let (r0, r1) = v.row_span(p.y, p.y + p.h, &cfg);
        let (c0, c1) = v.col_span(p.x, p.x + p.w, &cfg);
        self.front.fill(c0, r0, c1, r1, COLOR_PLAYER);
    }

    fn compose_end_panel(&mut self, world: &WorldState) {
        let title = if world.won { "YOU WIN!" } else { "GAME OVER" };
        let score_line = format!("Score: {}", world.score);
        let help = "[R] Restart   [Q] Quit";

        let inner_w = help.len().max(title.len()) + 4;
        let panel_w = inner_w + 2;
        let panel_h = 5;
        let x0 = self.term_w.saturating_sub(panel_w) / 2;
        let y0 = self.term_h.saturating_sub(panel_h) / 2;

        self.front.fill(x0, y0, x0 + panel_w, y0 + panel_h, COLOR_PANEL_BG);

        let center = |s: &str| x0 + (panel_w.saturating_sub(s.len())) / 2;
        self.front.put_str(center(title), y0 + 1, title, COLOR_HUD, COLOR_PANEL_BG);
        self.front.put_str(center(&score_line), y0 + 2, &score_line, COLOR_HUD, COLOR_PANEL_BG);
        self.front.put_str(center(help), y0 + 3, help, COLOR_HUD, COLOR_PANEL_BG);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;
        let mut buf = [0u8; 4];

        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch.encode_utf8(&mut buf)))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn cfg() -> WorldConfig {
        GameConfig::default().world
    }

    #[test]
    fn viewport_fits_inside_terminal() {
        let cfg = cfg();
        let v = Viewport::fit(80, 24, &cfg);
        assert!(v.cols <= 80);
        assert!(v.origin_row + v.rows <= 24);
        assert!(v.cols >= 1 && v.rows >= 1);
    }

    #[test]
    fn viewport_preserves_stage_aspect() {
        let cfg = cfg();
        let v = Viewport::fit(200, 50, &cfg);
        // cols/rows should approximate (width/height) * cell aspect
        let got = v.cols as f32 / v.rows as f32;
        let want = cfg.width / cfg.height * CELL_ASPECT;
        assert!((got - want).abs() / want < 0.15, "aspect {got} vs {want}");
    }

    #[test]
    fn cell_to_world_round_trips_center() {
        let cfg = cfg();
        let v = Viewport::fit(120, 40, &cfg);
        let col = (v.origin_col + v.cols / 2) as u16;
        let row = (v.origin_row + v.rows / 2) as u16;
        let (wx, wy) = v.cell_to_world(col, row, &cfg).unwrap();
        // Center cell maps near the stage center.
        assert!((wx - cfg.width / 2.0).abs() < cfg.width / v.cols as f32 + 1.0);
        assert!((wy - cfg.height / 2.0).abs() < cfg.height / v.rows as f32 + 1.0);
    }

    #[test]
    fn cell_outside_stage_maps_to_none() {
        let cfg = cfg();
        let v = Viewport::fit(120, 40, &cfg);
        assert!(v.cell_to_world(0, 0, &cfg).is_none()); // HUD row
        let past = (v.origin_col + v.cols) as u16;
        assert!(v.cell_to_world(past, (v.origin_row + 1) as u16, &cfg).is_none());
    }

    #[test]
    fn thin_world_rect_still_covers_a_row() {
        let cfg = cfg();
        let v = Viewport::fit(80, 24, &cfg);
        // A platform slab (10 world units) is thinner than one terminal
        // row at small sizes, but must still be drawn.
        let (r0, r1) = v.row_span(100.0, 100.0 + cfg.platform_height, &cfg);
        assert!(r1 > r0);
    }

    #[test]
    fn offstage_rows_are_empty() {
        let cfg = cfg();
        let v = Viewport::fit(80, 24, &cfg);
        let (r0, r1) = v.row_span(-60.0, -50.0, &cfg);
        assert_eq!(r0, r1);
    }
}
