use arbor::palette::{self, Rgb};
use arbor::{Bounds, Primitive, Scene};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use glam::Vec2;
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Raw mode + alternate screen for as long as this value lives.
pub struct Screen;

impl Screen {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self)
    }

    /// Wait up to `timeout` for a key press.
    pub fn poll_key(&self, timeout: Duration) -> io::Result<Option<KeyCode>> {
        if poll(timeout)? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some(key_event.code));
            }
        }
        Ok(None)
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// A single cell in the canvas
#[derive(Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Rgb>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

/// Maps world units (y up) onto terminal cells (y down, roughly 2:1 tall).
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    scale: f32,
    ground_row: i32,
    center_col: i32,
}

impl Viewport {
    /// Fits `bounds` into a `cols`×`rows` area with the root on the ground row.
    pub fn fit(bounds: Bounds, cols: u16, rows: u16) -> Self {
        let usable_cols = (cols as f32 - 2.0).max(1.0);
        let usable_rows = (rows as f32 - 3.0).max(1.0);
        let half_width = bounds.min.x.abs().max(bounds.max.x.abs()).max(1.0);
        let height = bounds.max.y.max(1.0);

        // One row is about two columns tall.
        let scale_x = usable_cols / (2.0 * half_width);
        let scale_y = usable_rows / height;
        let scale = scale_x.min(scale_y * 2.0);

        Self {
            scale,
            ground_row: rows as i32 - 2,
            center_col: cols as i32 / 2,
        }
    }

    pub fn to_cell(&self, p: Vec2) -> (i32, i32) {
        let d = p * self.scale;
        let col = self.center_col + d.x.round() as i32;
        let row = self.ground_row - (d.y / 2.0).round() as i32;
        (col, row)
    }

    pub fn ground_row(&self) -> i32 {
        self.ground_row
    }
}

/// Off-screen character buffer that a scene is rasterized into.
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Canvas matching the current terminal size.
    pub fn for_terminal() -> io::Result<Self> {
        let (w, h) = size()?;
        Ok(Self::new(w, h))
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    #[cfg(test)]
    fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.cells.get(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Rgb>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            let idx = y as usize * self.width as usize + x as usize;
            self.cells[idx] = Cell { ch, fg, bold };
        }
    }

    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Rgb>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Draws the ground line, the revealed scene and an optional caption box.
    pub fn draw_scene(&mut self, scene: &Scene<'_>, caption: &[String]) {
        self.clear();
        let view = Viewport::fit(scene.bounds, self.width, self.height);
        self.draw_ground(view.ground_row());
        if scene.revealed_branches() == 0 {
            self.draw_seed(&view, !scene.branches.is_empty());
        }

        for primitive in scene.primitives() {
            match primitive {
                Primitive::Segment(b) => {
                    let bold = b.thickness > 6.0;
                    self.line(view.to_cell(b.start), view.to_cell(b.end), Some(b.color.rgb()), bold);
                }
                Primitive::Leaf(l) => {
                    let (x, y) = view.to_cell(l.position);
                    let ch = if l.opacity >= 0.85 { '&' } else { '%' };
                    self.set(x, y, ch, Some(l.color.rgb()), l.size > 3.5);
                }
                Primitive::Flower(l) => {
                    let (x, y) = view.to_cell(l.position);
                    self.set(x, y, '*', Some(palette::BLOSSOM), true);
                    self.set(x + 1, y, '.', Some(palette::BLOSSOM_CENTER), false);
                }
                Primitive::Mote(p) => {
                    let (x, y) = view.to_cell(p.position);
                    let ch = if p.life > 0.5 { 'o' } else { '.' };
                    self.set(x, y, ch, Some(p.color.rgb()), false);
                }
            }
        }

        if !caption.is_empty() {
            self.draw_caption(caption);
        }
    }

    fn draw_ground(&mut self, row: i32) {
        for x in 0..self.width as i32 {
            let (ch, color) = if x % 5 == 0 { (',', palette::GRASS) } else { ('_', palette::GROUND) };
            self.set(x, row, ch, Some(color), false);
        }
    }

    /// Seed just above the root; a sprout on top while growth is pending.
    fn draw_seed(&mut self, view: &Viewport, sprouting: bool) {
        let (x, y) = view.to_cell(Vec2::ZERO);
        self.set(x, y - 1, 'o', Some(palette::SEED), true);
        if sprouting {
            self.set(x, y - 2, '|', Some(palette::GRASS), false);
        }
    }

    /// Rasterizes a segment with slope-appropriate characters.
    fn line(&mut self, from: (i32, i32), to: (i32, i32), fg: Option<Rgb>, bold: bool) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let ch = match (dx.signum(), dy.signum()) {
            (0, 0) => '.',
            (_, 0) => '~',
            (0, _) => '|',
            _ if dx.abs() > 2 * dy.abs() => '~',
            _ if dy.abs() > 2 * dx.abs() => '|',
            (1, -1) | (-1, 1) => '/',
            _ => '\\',
        };

        let steps = dx.abs().max(dy.abs()).max(1);
        for i in 0..=steps {
            let x = from.0 + (dx as f32 * i as f32 / steps as f32).round() as i32;
            let y = from.1 + (dy as f32 * i as f32 / steps as f32).round() as i32;
            self.set(x, y, ch, fg, bold);
        }
    }

    fn draw_caption(&mut self, lines: &[String]) {
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let box_width = inner as i32 + 4;
        let box_height = lines.len() as i32 + 2;
        let box_x = (self.width as i32 - box_width - 1).max(0);
        let box_y = 1;
        let border = Some(Rgb(0xDD, 0xDD, 0xDD));

        self.set(box_x, box_y, '+', border, false);
        self.set(box_x + box_width - 1, box_y, '+', border, false);
        for i in 1..box_width - 1 {
            self.set(box_x + i, box_y, '-', border, false);
            self.set(box_x + i, box_y + box_height - 1, '-', border, false);
        }
        for (i, line) in lines.iter().enumerate() {
            let y = box_y + 1 + i as i32;
            self.set(box_x, y, '|', border, false);
            self.set_str(box_x + 2, y, line, Some(Rgb(0xFF, 0xFF, 0xFF)), i == 0);
            self.set(box_x + box_width - 1, y, '|', border, false);
        }
        self.set(box_x, box_y + box_height - 1, '+', border, false);
        self.set(box_x + box_width - 1, box_y + box_height - 1, '+', border, false);
    }

    /// Writes the whole buffer to the (alternate) screen.
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout().lock();
        for (y, row) in self.cells.chunks(self.width.max(1) as usize).enumerate() {
            queue!(out, MoveTo(0, y as u16))?;
            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                match cell.fg {
                    Some(Rgb(r, g, b)) => {
                        queue!(out, SetForegroundColor(Color::Rgb { r, g, b }), Print(cell.ch), ResetColor)?
                    }
                    None => queue!(out, Print(cell.ch))?,
                }
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }
        out.flush()
    }

    /// Prints the buffer with ANSI escapes, trimming empty rows at the top.
    pub fn print_to_stdout(&self) {
        let rows: Vec<&[Cell]> = self.cells.chunks(self.width.max(1) as usize).collect();
        let first = rows
            .iter()
            .position(|row| row.iter().any(|c| c.ch != ' '))
            .unwrap_or(rows.len());

        for row in &rows[first..] {
            let mut line = String::new();
            for cell in row.iter() {
                if cell.ch == ' ' {
                    line.push(' ');
                    continue;
                }
                if cell.bold {
                    line.push_str("\x1b[1m");
                }
                if let Some(Rgb(r, g, b)) = cell.fg {
                    line.push_str(&format!("\x1b[38;2;{};{};{}m", r, g, b));
                }
                line.push(cell.ch);
                line.push_str("\x1b[0m");
            }
            println!("{}", line.trim_end());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_puts_root_on_ground() {
        let bounds = Bounds::new(Vec2::new(-50.0, 0.0), Vec2::new(50.0, 100.0));
        let view = Viewport::fit(bounds, 80, 24);
        assert_eq!(view.to_cell(Vec2::ZERO), (40, 22));
        let (_, top) = view.to_cell(Vec2::new(0.0, 100.0));
        assert!(top >= 0 && top < 22);
    }

    #[test]
    fn viewport_keeps_tree_on_screen() {
        let bounds = Bounds::new(Vec2::new(-300.0, 0.0), Vec2::new(120.0, 40.0));
        let view = Viewport::fit(bounds, 100, 30);
        for p in [bounds.min, bounds.max, Vec2::new(-300.0, 40.0)] {
            let (x, y) = view.to_cell(p);
            assert!((0..100).contains(&x), "x={} for {:?}", x, p);
            assert!((0..30).contains(&y), "y={} for {:?}", y, p);
        }
    }

    #[test]
    fn vertical_line_uses_pipes() {
        let mut canvas = Canvas::new(10, 10);
        canvas.line((5, 8), (5, 2), None, false);
        for y in 2..=8 {
            assert_eq!(canvas.get(5, y).map(|c| c.ch), Some('|'));
        }
    }

    #[test]
    fn diagonal_line_slopes() {
        let mut canvas = Canvas::new(10, 10);
        canvas.line((2, 8), (6, 4), None, false);
        assert_eq!(canvas.get(4, 6).map(|c| c.ch), Some('/'));
    }

    #[test]
    fn out_of_range_writes_are_dropped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.set(-1, 0, 'x', None, false);
        canvas.set(4, 4, 'x', None, false);
        assert!(canvas.cells.iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn scene_draws_trunk() {
        let mut tree = arbor::generate(300.0, Some(4));
        tree.reveal_all();
        let mut canvas = Canvas::new(80, 30);
        canvas.draw_scene(&tree.scene(), &["caption".to_string()]);
        let drawn = canvas.cells.iter().filter(|c| c.ch != ' ').count();
        assert!(drawn > 80);
    }

    #[test]
    fn bare_seed_is_drawn_above_ground() {
        let tree = arbor::generate(0.0, Some(1));
        let mut canvas = Canvas::new(40, 20);
        canvas.draw_scene(&tree.scene(), &[]);
        let view = Viewport::fit(tree.bounds(), 40, 20);
        let (x, y) = view.to_cell(Vec2::ZERO);
        assert_eq!(canvas.get(x, y - 1).map(|c| c.ch), Some('o'));
        assert_eq!(canvas.get(x, y - 2).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn pending_tree_shows_a_sprout() {
        let tree = arbor::generate(8.0, Some(1));
        assert!(!tree.branches.is_empty());
        let mut canvas = Canvas::new(40, 20);
        canvas.draw_scene(&tree.scene(), &[]);
        let view = Viewport::fit(tree.bounds(), 40, 20);
        let (x, y) = view.to_cell(Vec2::ZERO);
        assert_eq!(canvas.get(x, y - 1).map(|c| c.ch), Some('o'));
        assert_eq!(canvas.get(x, y - 2).map(|c| c.ch), Some('|'));
    }
}
