//! TorusLife engine internals and public API.

mod engine;
mod grid;
mod paint;
mod partition;
mod render;
mod rules;

pub use engine::{
    DEFAULT_HEIGHT, DEFAULT_SEED, DEFAULT_WIDTH, InputFrame, Present, TorusLife, TorusLifeConfig,
};
pub use grid::{Generation, Grid};
pub use paint::{LinePoints, PaintMode, clip, clip_segment, line_points};
pub use partition::{RowRange, partition_rows, split_rows_mut};
pub use render::{ColorPolicy, PixelBuffer, Rgba, render_rows};
pub use rules::{MAX_NEIGHBORS, RuleTable, next_state};
