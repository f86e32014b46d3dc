//! Row-parallel Conway's Game of Life (B3/S23) on a fixed-size torus.

pub mod error;
pub mod torus;
pub use error::{Error, Result};
pub use torus::{ColorPolicy, InputFrame, PaintMode, Present, TorusLife, TorusLifeConfig};
