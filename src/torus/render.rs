//! Pixel buffer and the per-row rasterizer used by the render phase.
//!
//! One 4-byte `Rgba` word per cell, row-major. The buffer is stored as a
//! `Vec<Rgba>` and viewed as bytes through `bytemuck`, so the presentation
//! side gets `width * height * 4` bytes without a copy or pointer cast.

use super::grid::Generation;
use super::partition::RowRange;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(0xFF, 0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgba = Rgba::new(0x00, 0x00, 0x00, 0xFF);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// How a cell state maps to a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorPolicy {
    /// Fixed foreground for live cells, fixed background for dead ones.
    Flat { alive: Rgba, dead: Rgba },
    /// Red follows `x`, green follows `y`, blue falls off with `x`; every
    /// channel is multiplied by the cell state so dead cells are black.
    Gradient,
}

impl Default for ColorPolicy {
    fn default() -> Self {
        ColorPolicy::Flat {
            alive: Rgba::WHITE,
            dead: Rgba::BLACK,
        }
    }
}

impl ColorPolicy {
    #[inline(always)]
    pub fn color(&self, state: u8, x: usize, y: usize, width: usize, height: usize) -> Rgba {
        match *self {
            ColorPolicy::Flat { alive, dead } => {
                if state != 0 {
                    alive
                } else {
                    dead
                }
            }
            ColorPolicy::Gradient => {
                let r = scale(x, width);
                let g = scale(y, height);
                let b = 0xFF - r;
                Rgba::new(r * state, g * state, b * state, 0xFF)
            }
        }
    }
}

/// Map `i` in `[0, extent)` onto `[0, 255]`.
#[inline(always)]
fn scale(i: usize, extent: usize) -> u8 {
    if extent <= 1 {
        return 0;
    }
    ((i * 0xFF) / (extent - 1)) as u8
}

/// Frame-sized pixel storage reused across frames.
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::default(); width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// Row-major bytes, 4 per cell.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.width + x]
    }
}

/// Rasterize the rows of `range` into `out`, which holds exactly those rows.
pub fn render_rows(view: Generation<'_>, policy: &ColorPolicy, range: RowRange, out: &mut [Rgba]) {
    let w = view.width();
    let h = view.height();
    let cells = view.cells();
    assert_eq!(out.len(), range.len() * w, "pixel slice does not match range {range:?}");

    for (y, out_row) in range.rows().zip(out.chunks_exact_mut(w)) {
        let row = &cells[y * w..(y + 1) * w];
        for (x, (px, &state)) in out_row.iter_mut().zip(row).enumerate() {
            *px = policy.color(state, x, y, w, h);
        }
    }
}
