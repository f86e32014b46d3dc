use rayon::prelude::*;
use std::sync::OnceLock;

use super::grid::{Generation, Grid};
use super::paint::{PaintMode, clip, clip_segment, line_points};
use super::partition::{RowRange, partition_rows, split_rows_mut};
use super::render::{ColorPolicy, PixelBuffer, render_rows};
use crate::error::{Error, Result};

pub const DEFAULT_WIDTH: usize = 640;
pub const DEFAULT_HEIGHT: usize = 360;
pub const DEFAULT_SEED: u64 = 0x5EED_1234_ABCD_EF01;

static HARDWARE_THREADS: OnceLock<usize> = OnceLock::new();

#[inline]
fn hardware_thread_count() -> usize {
    *HARDWARE_THREADS.get_or_init(|| num_cpus::get().max(1))
}

/// Resolve the worker count from a config, falling back to the host's
/// hardware parallelism.
fn resolve_thread_count(config: &TorusLifeConfig) -> Result<usize> {
    match config.thread_count {
        Some(0) => Err(Error::InvalidWorkerCount),
        Some(n) => Ok(n),
        None => Ok(hardware_thread_count()),
    }
}

/// Receives each fully rendered frame: `width * height * 4` row-major bytes.
pub trait Present {
    fn present(&mut self, pixels: &[u8], width: usize, height: usize);
}

impl<F> Present for F
where
    F: FnMut(&[u8], usize, usize),
{
    fn present(&mut self, pixels: &[u8], width: usize, height: usize) {
        self(pixels, width, height)
    }
}

/// Input sampled by the host for one frame.
///
/// `*_pressed` fields are edges (true only on the frame the key went down);
/// `paint_held` is level-triggered and paints every frame it stays true.
/// `cursor` is in cell coordinates and may lie outside the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub cursor: (i64, i64),
    pub paint_held: bool,
    pub toggle_pressed: bool,
    pub clear_pressed: bool,
    pub reset_pressed: bool,
}

/// Configuration for a TorusLife engine instance.
///
/// `TorusLifeConfig::default()` gives a randomly seeded
/// `DEFAULT_WIDTH x DEFAULT_HEIGHT` torus using every hardware thread.
#[derive(Clone, Debug)]
pub struct TorusLifeConfig {
    pub width: usize,
    pub height: usize,
    /// Seed for the grid's random source (initial fill, reset, sprinkle).
    pub seed: u64,
    /// Number of workers. `None` means `num_cpus::get()`.
    pub thread_count: Option<usize>,
    pub color_policy: ColorPolicy,
    pub paint_mode: PaintMode,
    /// Random cells forced alive on every running tick. 0 disables.
    pub sprinkle_per_tick: usize,
    pub start_running: bool,
}

impl Default for TorusLifeConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: DEFAULT_SEED,
            thread_count: None,
            color_policy: ColorPolicy::default(),
            paint_mode: PaintMode::default(),
            sprinkle_per_tick: 0,
            start_running: true,
        }
    }
}

impl TorusLifeConfig {
    pub fn size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set an explicit worker count. Zero is rejected at engine construction.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n);
        self
    }

    pub fn color_policy(mut self, policy: ColorPolicy) -> Self {
        self.color_policy = policy;
        self
    }

    pub fn paint_mode(mut self, mode: PaintMode) -> Self {
        self.paint_mode = mode;
        self
    }

    pub fn sprinkle_per_tick(mut self, n: usize) -> Self {
        self.sprinkle_per_tick = n;
        self
    }

    pub fn start_running(mut self, running: bool) -> Self {
        self.start_running = running;
        self
    }
}

/// Row-partitioned render pass. Each range writes only its own rows of `out`.
fn render_parallel(
    pool: &rayon::ThreadPool,
    view: Generation<'_>,
    policy: &ColorPolicy,
    ranges: &[RowRange],
    out: &mut PixelBuffer,
) {
    assert_eq!(
        (out.width(), out.height()),
        (view.width(), view.height()),
        "pixel buffer does not match grid dimensions"
    );
    let jobs = split_rows_mut(out.pixels_mut(), view.width(), ranges);
    pool.install(|| {
        jobs.into_par_iter()
            .for_each(|(range, rows)| render_rows(view, policy, range, rows));
    });
}

pub struct TorusLife {
    grid: Grid,
    pixels: PixelBuffer,
    pool: rayon::ThreadPool,
    /// Fixed for the engine's lifetime: height and worker count never change.
    ranges: Vec<RowRange>,
    policy: ColorPolicy,
    paint_mode: PaintMode,
    sprinkle_per_tick: usize,
    running: bool,
    /// Cursor position of the previous painted frame while the button is held.
    last_cursor: Option<(i64, i64)>,
}

impl TorusLife {
    pub fn new() -> Result<Self> {
        Self::with_config(TorusLifeConfig::default())
    }

    /// Create a TorusLife engine with explicit configuration.
    pub fn with_config(config: TorusLifeConfig) -> Result<Self> {
        let threads = resolve_thread_count(&config)?;
        let grid = Grid::new(config.width, config.height, config.seed)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("torus-life-{i}"))
            .build()?;
        let ranges = partition_rows(config.height, threads);

        tracing::debug!(
            width = config.width,
            height = config.height,
            threads,
            policy = ?config.color_policy,
            paint_mode = ?config.paint_mode,
            "built torus-life engine"
        );

        Ok(Self {
            pixels: PixelBuffer::new(config.width, config.height),
            grid,
            pool,
            ranges,
            policy: config.color_policy,
            paint_mode: config.paint_mode,
            sprinkle_per_tick: config.sprinkle_per_tick,
            running: config.start_running,
            last_cursor: None,
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn row_ranges(&self) -> &[RowRange] {
        &self.ranges
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u64 {
        self.grid.generation()
    }

    pub fn population(&self) -> u64 {
        self.grid.population()
    }

    /// Advance one generation across all workers, then swap buffers.
    ///
    /// Returns only after every range has been written.
    pub fn step_generation(&mut self) {
        let ranges = &self.ranges;
        let (view, next) = self.grid.split_for_update();
        let jobs = split_rows_mut(next, view.width(), ranges);
        self.pool.install(|| {
            jobs.into_par_iter()
                .for_each(|(range, rows)| view.apply_range(range, rows));
        });
        self.grid.advance();
    }

    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step_generation();
        }
    }

    /// Rasterize the current generation into the engine's pixel buffer.
    pub fn render_frame(&mut self) -> &PixelBuffer {
        render_parallel(
            &self.pool,
            self.grid.current(),
            &self.policy,
            &self.ranges,
            &mut self.pixels,
        );
        &self.pixels
    }

    /// Rasterize the current generation into a caller-owned buffer of the
    /// same dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `out` is not exactly `width x height` of this engine's grid.
    pub fn render_into(&self, out: &mut PixelBuffer) {
        render_parallel(&self.pool, self.grid.current(), &self.policy, &self.ranges, out);
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
        tracing::info!(running = self.running, "toggled simulation");
    }

    /// Mark one cell alive. Out-of-range coordinates are rejected with
    /// [`Error::OutOfBounds`] and the grid is left untouched.
    ///
    /// This is the checked, cell-coordinate entry point. Raw cursor input,
    /// which may lie anywhere, goes through [`TorusLife::paint`], which clips
    /// to the grid instead of failing.
    pub fn set_alive(&mut self, x: usize, y: usize) -> Result<()> {
        self.grid.set_alive(x, y)
    }

    /// Paint at `cursor` for a frame in which the button is held.
    ///
    /// In [`PaintMode::Line`] the segment from the previous held position is
    /// filled as well. The segment is clipped to the grid before it is
    /// walked, so any `i64` cursor is accepted and off-grid parts cost nothing.
    pub fn paint(&mut self, cursor: (i64, i64)) {
        let from = match self.paint_mode {
            PaintMode::Line => self.last_cursor.unwrap_or(cursor),
            PaintMode::Point => cursor,
        };
        self.last_cursor = Some(cursor);
        let (w, h) = (self.grid.width(), self.grid.height());
        let Some((start, end)) = clip_segment(from, cursor, w, h) else {
            return;
        };
        for point in line_points(start, end) {
            if let Some((x, y)) = clip(point, w, h) {
                self.grid.mark_alive(x, y);
            }
        }
    }

    /// Forget the previous paint position (button released).
    pub fn release_paint(&mut self) {
        self.last_cursor = None;
    }

    pub fn clear_grid(&mut self) {
        self.grid.clear();
        tracing::info!(generation = self.grid.generation(), "cleared grid");
    }

    pub fn reset_grid(&mut self) {
        self.grid.reset();
        tracing::info!(population = self.grid.population(), "reseeded grid");
    }

    /// One host frame: step if running, apply input, render, present.
    ///
    /// Rendering and presentation happen every frame, paused or not.
    pub fn tick<P: Present + ?Sized>(&mut self, input: &InputFrame, sink: &mut P) {
        if self.running {
            self.step_generation();
            if self.sprinkle_per_tick > 0 {
                self.grid.sprinkle(self.sprinkle_per_tick);
            }
        }

        if input.toggle_pressed {
            self.toggle_running();
        }
        if input.clear_pressed {
            self.clear_grid();
        }
        if input.reset_pressed {
            self.reset_grid();
        }
        if input.paint_held {
            self.paint(input.cursor);
        } else {
            self.release_paint();
        }

        let (w, h) = (self.grid.width(), self.grid.height());
        let frame = self.render_frame();
        sink.present(frame.as_bytes(), w, h);

        tracing::trace!(generation = self.grid.generation(), running = self.running, "tick");
    }
}

#[cfg(test)]
mod tests {
    use super::{InputFrame, TorusLife, TorusLifeConfig, hardware_thread_count};
    use crate::error::Error;
    use crate::torus::paint::PaintMode;
    use crate::torus::render::PixelBuffer;

    fn engine(width: usize, height: usize, threads: usize) -> TorusLife {
        TorusLife::with_config(
            TorusLifeConfig::default()
                .size(width, height)
                .thread_count(threads)
                .seed(0xA55A_CE11_1234_5678),
        )
        .unwrap()
    }

    #[test]
    fn default_pool_uses_hardware_thread_count() {
        let engine = TorusLife::with_config(TorusLifeConfig::default().size(32, 32)).unwrap();
        assert_eq!(engine.worker_count(), hardware_thread_count());
        assert_eq!(engine.pool.current_num_threads(), hardware_thread_count());
    }

    #[test]
    fn zero_workers_are_rejected() {
        let result = TorusLife::with_config(TorusLifeConfig::default().thread_count(0));
        assert!(matches!(result, Err(Error::InvalidWorkerCount)));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let result = TorusLife::with_config(TorusLifeConfig::default().size(0, 10));
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn more_workers_than_rows_still_steps() {
        let mut wide = engine(9, 3, 8);
        let mut single = engine(9, 3, 1);
        wide.step_n(3);
        single.step_n(3);
        assert_eq!(wide.grid().cells(), single.grid().cells());
    }

    #[test]
    fn step_advances_generation() {
        let mut engine = engine(16, 16, 2);
        assert_eq!(engine.generation(), 0);
        engine.step_generation();
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn paused_tick_does_not_step_but_still_presents() {
        let mut engine = TorusLife::with_config(
            TorusLifeConfig::default()
                .size(8, 8)
                .thread_count(2)
                .start_running(false),
        )
        .unwrap();
        let before = engine.grid().cells().to_vec();
        let mut frames = 0;
        let mut sink = |pixels: &[u8], w: usize, h: usize| {
            assert_eq!(pixels.len(), w * h * 4);
            frames += 1;
        };
        engine.tick(&InputFrame::default(), &mut sink);
        engine.tick(&InputFrame::default(), &mut sink);
        assert_eq!(frames, 2);
        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.grid().cells(), before.as_slice());
    }

    #[test]
    fn line_paint_connects_consecutive_held_frames() {
        let mut engine = TorusLife::with_config(
            TorusLifeConfig::default()
                .size(16, 16)
                .thread_count(2)
                .paint_mode(PaintMode::Line),
        )
        .unwrap();
        engine.clear_grid();
        engine.paint((1, 1));
        engine.paint((6, 1));
        assert_eq!(engine.population(), 6);
        for x in 1..=6 {
            assert_eq!(engine.grid().get(x, 1), 1);
        }

        engine.release_paint();
        engine.paint((10, 10));
        assert_eq!(engine.population(), 7);
    }

    #[test]
    fn point_paint_marks_only_current_cell() {
        let mut engine = TorusLife::with_config(
            TorusLifeConfig::default()
                .size(16, 16)
                .thread_count(2)
                .paint_mode(PaintMode::Point),
        )
        .unwrap();
        engine.clear_grid();
        engine.paint((1, 1));
        engine.paint((6, 1));
        assert_eq!(engine.population(), 2);
    }

    #[test]
    fn paint_clips_outside_cursor_positions() {
        let mut engine = engine(4, 4, 1);
        engine.clear_grid();
        engine.paint((-3, 1));
        engine.paint((6, 1));
        assert_eq!(engine.population(), 4);
        engine.release_paint();
        engine.paint((100, 100));
        assert_eq!(engine.population(), 4);
    }

    #[test]
    fn paint_with_extreme_cursor_stays_on_grid() {
        let mut engine = engine(8, 8, 2);
        engine.clear_grid();
        engine.paint((3, 3));
        engine.paint((i64::MIN, 3));
        assert_eq!(engine.population(), 4);
        engine.release_paint();
        engine.paint((i64::MAX, i64::MAX));
        engine.paint((i64::MAX, i64::MIN));
        assert_eq!(engine.population(), 4);
    }

    #[test]
    #[should_panic(expected = "pixel buffer does not match grid dimensions")]
    fn render_into_rejects_mismatched_buffer() {
        let engine = engine(8, 8, 2);
        let mut wrong = PixelBuffer::new(8, 7);
        engine.render_into(&mut wrong);
    }

    #[test]
    fn sprinkle_runs_only_while_running() {
        let mut engine = TorusLife::with_config(
            TorusLifeConfig::default()
                .size(32, 32)
                .thread_count(2)
                .sprinkle_per_tick(5)
                .start_running(false),
        )
        .unwrap();
        engine.clear_grid();
        let mut sink = |_: &[u8], _: usize, _: usize| {};
        engine.tick(&InputFrame::default(), &mut sink);
        assert_eq!(engine.population(), 0);

        engine.toggle_running();
        engine.tick(&InputFrame::default(), &mut sink);
        assert!(engine.population() > 0);
    }
}
