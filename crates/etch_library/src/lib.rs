pub mod canvas;
pub mod event;
pub mod interpreter;
pub mod keys;
pub mod knob;
pub mod pen;
pub mod planner;
pub mod plotter;
pub mod preset;
pub mod raster;
pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
