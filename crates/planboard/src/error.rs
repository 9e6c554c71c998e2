#![forbid(unsafe_code)]

//! Umbrella error for building a [`Planner`](crate::Planner).
//!
//! Each subsystem keeps its own typed error; this enum only wraps them so a
//! host can `?` through setup. Runtime operations (drag, drop, undo, layout
//! writes) never fail: they log and degrade instead.

use planboard_core::GestureConfigError;
use planboard_runtime::{BoardError, StorageError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("gesture config: {0}")]
    Gesture(#[from] GestureConfigError),

    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("board: {0}")]
    Board(#[from] BoardError),
}

pub type Result<T> = std::result::Result<T, Error>;
