//! Parallel per-game processing with per-game failure isolation.

use std::{collections::HashSet, num::NonZeroUsize};

use rayon::prelude::*;
use spadl::Game;

use crate::{
    game::{GameError, MatchEvents, Pipeline},
    store::{StoreError, TableStore},
};

/// Something processed as one independent unit of a batch.
pub trait BatchItem: Sync {
    fn game_id(&self) -> u64;
}

impl BatchItem for Game {
    fn game_id(&self) -> u64 {
        self.game_id
    }
}

impl BatchItem for MatchEvents {
    fn game_id(&self) -> u64 {
        self.game.game_id
    }
}

#[derive(Debug, derive_more::Display)]
#[display("game {game_id}: {error}")]
pub struct GameFailure {
    pub game_id: u64,
    pub error: GameError,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<u64>,
    pub failed: Vec<GameFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs `action` on a dedicated pool of `jobs` threads, or on the global
/// pool when no count is given or the pool cannot be built.
fn with_pool<R, F>(jobs: Option<NonZeroUsize>, action: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let Some(jobs) = jobs else {
        return action();
    };
    match rayon::ThreadPoolBuilder::new().num_threads(jobs.get()).build() {
        Ok(pool) => pool.install(action),
        Err(err) => {
            tracing::warn!(%err, "failed to build a thread pool, using the global one");
            action()
        }
    }
}

/// Applies `work` to every item in parallel.
///
/// A failing game is logged and recorded, and never affects the others.
/// Only the first item of a game id is processed; later items with the same
/// id fail with [`GameError::DuplicateGame`].
pub fn run_batch<T, F>(items: &[T], jobs: Option<NonZeroUsize>, work: F) -> BatchReport
where
    T: BatchItem,
    F: Fn(&T) -> Result<(), GameError> + Sync,
{
    let mut seen = HashSet::with_capacity(items.len());
    let repeated: Vec<bool> = items.iter().map(|item| !seen.insert(item.game_id())).collect();

    let outcomes: Vec<(u64, Result<(), GameError>)> = with_pool(jobs, || {
        items
            .par_iter()
            .zip(&repeated)
            .map(|(item, &repeated)| {
                let game_id = item.game_id();
                let _span = tracing::info_span!("game", game_id).entered();
                let result = if repeated {
                    Err(GameError::DuplicateGame { game_id })
                } else {
                    work(item)
                };
                match &result {
                    Ok(()) => tracing::debug!("done"),
                    Err(error) => tracing::warn!(%error, "game failed"),
                }
                (game_id, result)
            })
            .collect()
    });

    let mut report = BatchReport::default();
    for (game_id, result) in outcomes {
        match result {
            Ok(()) => report.completed.push(game_id),
            Err(error) => report.failed.push(GameFailure { game_id, error }),
        }
    }
    tracing::info!(
        completed = report.completed.len(),
        failed = report.failed.len(),
        "batch finished"
    );
    report
}

/// Games whose items completed, once each, in input order.
///
/// A completed id always belongs to the first item carrying it.
fn completed_games<T, F>(items: &[T], report: &BatchReport, game: F) -> Vec<Game>
where
    T: BatchItem,
    F: Fn(&T) -> &Game,
{
    let mut completed: HashSet<u64> = report.completed.iter().copied().collect();
    items
        .iter()
        .filter(|item| completed.remove(&item.game_id()))
        .map(|item| game(item).clone())
        .collect()
}

/// Converts every game and stores its action table.
///
/// The games index lists the games whose actions were stored.
pub fn convert_matches(
    pipeline: &Pipeline,
    store: &TableStore,
    matches: &[MatchEvents],
    jobs: Option<NonZeroUsize>,
) -> Result<BatchReport, StoreError> {
    let report = run_batch(matches, jobs, |input| {
        let actions = pipeline.convert_game(&input.game, &input.events)?;
        tracing::debug!(actions = actions.len(), "converted");
        Ok(store.write_actions(input.game.game_id, &actions)?)
    });
    store.write_games(&completed_games(matches, &report, |input| &input.game))?;
    Ok(report)
}

/// Computes features and labels for every game of the stored index.
pub fn compute_stored(
    pipeline: &Pipeline,
    store: &TableStore,
    jobs: Option<NonZeroUsize>,
) -> Result<BatchReport, StoreError> {
    let games = store.read_games()?;
    Ok(run_batch(&games, jobs, |game| {
        let actions = store.read_actions(game)?;
        let tables = pipeline.compute_tables(game, actions)?;
        Ok(store.write_features_and_labels(game.game_id, &tables.features, &tables.labels)?)
    }))
}

/// Converts every game and stores all of its tables in one pass.
pub fn run_matches(
    pipeline: &Pipeline,
    store: &TableStore,
    matches: &[MatchEvents],
    jobs: Option<NonZeroUsize>,
) -> Result<BatchReport, StoreError> {
    let report = run_batch(matches, jobs, |input| {
        let tables = pipeline.process_game(&input.game, &input.events)?;
        Ok(store.write_tables(&tables)?)
    });
    store.write_games(&completed_games(matches, &report, |input| &input.game))?;
    Ok(report)
}
