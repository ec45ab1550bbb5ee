//! Conversion and VAEP feature/label computation over many games.
//!
//! A [`Pipeline`] is built from a [`PipelineConfig`] and processes one game
//! at a time. [`run_batch`] runs games in parallel, isolating failures so
//! that one malformed game never aborts the others, and [`TableStore`]
//! keeps the resulting per-game tables on disk.

pub use self::{
    batch::{
        BatchItem, BatchReport, GameFailure, compute_stored, convert_matches, run_batch,
        run_matches,
    },
    config::{ConfigError, PipelineConfig},
    game::{GameError, GameTables, MatchCollection, MatchEvents, Pipeline},
    store::{StoreError, Table, TableStore},
};

mod batch;
mod config;
mod game;
mod store;
