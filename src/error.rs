//! Error types.
//!
//! `EngineError` is an invariant violation inside a tick and is never
//! recovered from. `SaveError` and `LevelError` describe bad input files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::state::State;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("rabbit {id}: no behaviour handled state {state}")]
    UnhandledState { id: usize, state: State },

    #[error("rabbit {id}: no behaviour proposed a state")]
    NoStateProposed { id: usize },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("value {value:?} for {key} is not an integer")]
    MalformedValue { key: String, value: String },

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("line {line}: unknown state {name:?}")]
    UnknownState { line: usize, name: String },

    #[error("save file has no terrain rows")]
    MissingTerrain,

    #[error("could not access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("line {line}, column {column}: unknown level char {ch:?}")]
    UnknownChar { line: usize, column: usize, ch: char },

    #[error("level has no rows")]
    Empty,

    #[error("could not read level {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
