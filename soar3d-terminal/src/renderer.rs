//! Terminal raster surface
//!
//! Pixels are half a character cell tall: each cell shows two vertically
//! stacked pixels with an upper-half block, foreground on top and
//! background below.
use crossterm::{
    style::{self, Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use soar3d_core::{Color, Font, FontStyle, Surface};
use std::io::Write;

const UPPER_HALF: char = '\u{2580}';

/// Pixels stacked per terminal cell
pub const PIXELS_PER_ROW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TextCell {
    c: char,
    color: Color,
    bold: bool,
}

/// Software raster drawn to the terminal with crossterm
pub struct TerminalSurface {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    // One slot per character cell
    text: Vec<Option<TextCell>>,
    color: Color,
    bold: bool,
    background: Color,
}

impl TerminalSurface {
    /// A surface covering `columns` x `rows` character cells
    pub fn new(columns: usize, rows: usize, background: Color) -> Self {
        let height = rows * PIXELS_PER_ROW;
        Self {
            width: columns,
            height,
            pixels: vec![background; columns * height],
            text: vec![None; columns * rows],
            color: Color::BLACK,
            bold: false,
            background,
        }
    }

    /// Size in pixels, the space a [`Camera`](soar3d_core::Camera) should
    /// project into
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
        self.text.fill(None);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn text_at(&self, column: usize, row: usize) -> Option<char> {
        self.text[row * self.width + column].map(|cell| cell.c)
    }

    pub fn is_bold_at(&self, column: usize, row: usize) -> bool {
        self.text[row * self.width + column].is_some_and(|cell| cell.bold)
    }

    fn plot(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = self.color;
        }
    }

    fn rasterize_triangle(&mut self, v0: (f32, f32), v1: (f32, f32), v2: (f32, f32)) {
        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);

                // Either winding; culling already happened upstream
                if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                    let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                        || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                    if inside {
                        self.plot(x, y);
                    }
                }
            }
        }
    }

    /// Write the frame to `writer`, starting at the cursor's row 0
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let rows = self.height / PIXELS_PER_ROW;
        for row in 0..rows {
            let mut last: Option<(Color, Color)> = None;
            for x in 0..self.width {
                if let Some(cell) = self.text[row * self.width + x] {
                    writer.queue(SetForegroundColor(rgb(cell.color)))?;
                    writer.queue(SetBackgroundColor(rgb(self.background)))?;
                    if cell.bold {
                        writer.queue(SetAttribute(Attribute::Bold))?;
                    }
                    writer.queue(Print(cell.c))?;
                    if cell.bold {
                        writer.queue(SetAttribute(Attribute::NormalIntensity))?;
                    }
                    last = None;
                    continue;
                }

                let top = self.pixel(x, row * PIXELS_PER_ROW);
                let bottom = self.pixel(x, row * PIXELS_PER_ROW + 1);
                if last != Some((top, bottom)) {
                    writer.queue(SetForegroundColor(rgb(top)))?;
                    writer.queue(SetBackgroundColor(rgb(bottom)))?;
                    last = Some((top, bottom));
                }
                writer.queue(Print(UPPER_HALF))?;
            }
            if row + 1 < rows {
                writer.queue(ResetColor)?;
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_font(&mut self, font: &Font) {
        self.bold = matches!(font.style, FontStyle::Bold | FontStyle::BoldItalic);
    }

    /// Bresenham line
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (mut x, mut y) = (x1, y1);
        let dx = (x2 - x1).abs();
        let dy = -(y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x, y);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Fan-triangulated fill; faces here are small convex loops
    fn fill_polygon(&mut self, xs: &[i32], ys: &[i32]) {
        let n = xs.len().min(ys.len());
        if n < 3 {
            return;
        }
        let v = |i: usize| (xs[i] as f32, ys[i] as f32);
        for i in 1..n - 1 {
            self.rasterize_triangle(v(0), v(i), v(i + 1));
        }
    }

    /// Text lands on whole cells; `y` is in pixels
    fn draw_string(&mut self, text: &str, x: i32, y: i32) {
        let row = y.max(0) as usize / PIXELS_PER_ROW;
        let rows = self.height / PIXELS_PER_ROW;
        if row >= rows {
            return;
        }
        for (i, c) in text.chars().enumerate() {
            let column = x + i as i32;
            if column >= 0 && (column as usize) < self.width {
                self.text[row * self.width + column as usize] = Some(TextCell {
                    c,
                    color: self.color,
                    bold: self.bold,
                });
            }
        }
    }

    fn fill_circle(&mut self, x: i32, y: i32, diameter: i32) {
        let r = diameter as f32 / 2.0;
        let reach = r.ceil() as i32;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let (fx, fy) = (dx as f32, dy as f32);
                if fx * fx + fy * fy <= r * r {
                    self.plot(x + dx, y + dy);
                }
            }
        }
    }
}

fn rgb(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
