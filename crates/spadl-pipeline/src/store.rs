//! Per-game table storage in a directory of CSV files.
//!
//! ```text
//! <root>/games.json
//! <root>/actions/<game_id>.csv
//! <root>/features/<game_id>.csv
//! <root>/labels/<game_id>.csv
//! ```
//!
//! Tables are written to a temporary file next to their destination and
//! renamed into place, so readers never observe a half-written table and a
//! game whose tables fail to write leaves none of them behind.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use spadl::{Action, Game, NamedAction, SchemaViolation, add_names, strip_names, validate_actions};
use spadl_vaep::{FeatureMatrix, LabelMatrix};

use crate::game::GameTables;

const ACTIONS_DIR: &str = "actions";
const FEATURES_DIR: &str = "features";
const LABELS_DIR: &str = "labels";
const GAMES_FILE: &str = "games.json";

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum StoreError {
    #[display("I/O error on {}: {source}", path.display())]
    #[from(skip)]
    Io { path: PathBuf, source: io::Error },
    #[display("CSV error in {}: {source}", path.display())]
    #[from(skip)]
    Csv { path: PathBuf, source: csv::Error },
    #[display("JSON error in {}: {source}", path.display())]
    #[from(skip)]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("stored actions are invalid: {_0}")]
    Schema(SchemaViolation),
}

impl StoreError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_owned(),
            source,
        }
    }

    fn csv(path: &Path) -> impl FnOnce(csv::Error) -> Self + '_ {
        move |source| Self::Csv {
            path: path.to_owned(),
            source,
        }
    }

    fn json(path: &Path) -> impl FnOnce(serde_json::Error) -> Self + '_ {
        move |source| Self::Json {
            path: path.to_owned(),
            source,
        }
    }
}

/// A table written to a temporary path, waiting to be renamed into place.
#[derive(Debug)]
struct Staged {
    temp: PathBuf,
    target: PathBuf,
}

impl Staged {
    fn discard(self) {
        // best effort: the file may never have been created
        let _ = fs::remove_file(&self.temp);
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

fn stage_csv<F>(target: PathBuf, write: F) -> Result<Staged, StoreError>
where
    F: FnOnce(&mut csv::Writer<BufWriter<File>>) -> Result<(), csv::Error>,
{
    let staged = Staged {
        temp: temp_path(&target),
        target,
    };
    let result = File::create(&staged.temp)
        .map_err(StoreError::io(&staged.temp))
        .and_then(|file| {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(true)
                .from_writer(BufWriter::new(file));
            write(&mut writer).map_err(StoreError::csv(&staged.temp))?;
            writer.flush().map_err(StoreError::io(&staged.temp))
        });
    match result {
        Ok(()) => Ok(staged),
        Err(err) => {
            staged.discard();
            Err(err)
        }
    }
}

/// Renames staged tables into place, or discards all of them if any of them
/// failed to be written.
fn commit(staged: Vec<Result<Staged, StoreError>>) -> Result<(), StoreError> {
    let mut ready = Vec::with_capacity(staged.len());
    let mut failure = None;
    for table in staged {
        match table {
            Ok(table) => ready.push(table),
            Err(err) => failure = failure.or(Some(err)),
        }
    }
    if let Some(err) = failure {
        ready.into_iter().for_each(Staged::discard);
        return Err(err);
    }
    for table in ready {
        fs::rename(&table.temp, &table.target).map_err(StoreError::io(&table.target))?;
    }
    Ok(())
}

fn write_actions(writer: &mut csv::Writer<BufWriter<File>>, actions: &[Action]) -> Result<(), csv::Error> {
    for row in add_names(actions) {
        writer.serialize(row)?;
    }
    Ok(())
}

fn write_features(writer: &mut csv::Writer<BufWriter<File>>, features: &FeatureMatrix) -> Result<(), csv::Error> {
    writer.write_record(features.columns())?;
    for row in features.rows() {
        writer.serialize(row)?;
    }
    Ok(())
}

fn write_labels(writer: &mut csv::Writer<BufWriter<File>>, labels: &LabelMatrix) -> Result<(), csv::Error> {
    writer.write_record(labels.columns())?;
    for row in labels.rows() {
        let bits: Vec<u8> = row.iter().map(|&label| u8::from(label)).collect();
        writer.serialize(bits)?;
    }
    Ok(())
}

/// A header and its rows, as read back from a numeric table.
pub type Table<T> = (Vec<String>, Vec<Vec<T>>);

#[derive(Debug, Clone)]
pub struct TableStore {
    root: PathBuf,
}

impl TableStore {
    /// Opens a store rooted at `root`, creating its directories if needed.
    pub fn create<P>(root: P) -> Result<Self, StoreError>
    where
        P: Into<PathBuf>,
    {
        let store = Self { root: root.into() };
        for dir in [ACTIONS_DIR, FEATURES_DIR, LABELS_DIR] {
            let path = store.root.join(dir);
            fs::create_dir_all(&path).map_err(StoreError::io(&path))?;
        }
        Ok(store)
    }

    fn table_path(&self, dir: &str, game_id: u64) -> PathBuf {
        self.root.join(dir).join(format!("{game_id}.csv"))
    }

    #[must_use]
    pub fn actions_path(&self, game_id: u64) -> PathBuf {
        self.table_path(ACTIONS_DIR, game_id)
    }

    #[must_use]
    pub fn features_path(&self, game_id: u64) -> PathBuf {
        self.table_path(FEATURES_DIR, game_id)
    }

    #[must_use]
    pub fn labels_path(&self, game_id: u64) -> PathBuf {
        self.table_path(LABELS_DIR, game_id)
    }

    pub fn write_actions(&self, game_id: u64, actions: &[Action]) -> Result<(), StoreError> {
        commit(vec![stage_csv(self.actions_path(game_id), |w| {
            write_actions(w, actions)
        })])
    }

    /// Writes the feature and label tables of a game, all or nothing.
    pub fn write_features_and_labels(
        &self,
        game_id: u64,
        features: &FeatureMatrix,
        labels: &LabelMatrix,
    ) -> Result<(), StoreError> {
        commit(vec![
            stage_csv(self.features_path(game_id), |w| write_features(w, features)),
            stage_csv(self.labels_path(game_id), |w| write_labels(w, labels)),
        ])
    }

    /// Writes all three tables of a game, all or nothing.
    pub fn write_tables(&self, tables: &GameTables) -> Result<(), StoreError> {
        let game_id = tables.game.game_id;
        commit(vec![
            stage_csv(self.actions_path(game_id), |w| write_actions(w, &tables.actions)),
            stage_csv(self.features_path(game_id), |w| write_features(w, &tables.features)),
            stage_csv(self.labels_path(game_id), |w| write_labels(w, &tables.labels)),
        ])
    }

    /// Reads an action table back and validates it against `game`.
    pub fn read_actions(&self, game: &Game) -> Result<Vec<Action>, StoreError> {
        let path = self.actions_path(game.game_id);
        let file = File::open(&path).map_err(StoreError::io(&path))?;
        let rows = csv::Reader::from_reader(BufReader::new(file))
            .deserialize::<NamedAction>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::csv(&path))?;
        let actions = strip_names(game.game_id, rows)?;
        validate_actions(game, &actions)?;
        Ok(actions)
    }

    pub fn read_features(&self, game_id: u64) -> Result<Table<f64>, StoreError> {
        read_table(&self.features_path(game_id))
    }

    pub fn read_labels(&self, game_id: u64) -> Result<Table<u8>, StoreError> {
        read_table(&self.labels_path(game_id))
    }

    pub fn write_games(&self, games: &[Game]) -> Result<(), StoreError> {
        let target = self.root.join(GAMES_FILE);
        let temp = temp_path(&target);
        let result = File::create(&temp)
            .map_err(StoreError::io(&temp))
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, games).map_err(StoreError::json(&temp))?;
                writeln!(writer).map_err(StoreError::io(&temp))?;
                writer.flush().map_err(StoreError::io(&temp))
            });
        if let Err(err) = result {
            let _ = fs::remove_file(&temp);
            return Err(err);
        }
        fs::rename(&temp, &target).map_err(StoreError::io(&target))
    }

    pub fn read_games(&self) -> Result<Vec<Game>, StoreError> {
        let path = self.root.join(GAMES_FILE);
        let file = File::open(&path).map_err(StoreError::io(&path))?;
        serde_json::from_reader(BufReader::new(file)).map_err(StoreError::json(&path))
    }
}

fn read_table<T>(path: &Path) -> Result<Table<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path).map_err(StoreError::io(path))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let columns = reader
        .headers()
        .map_err(StoreError::csv(path))?
        .iter()
        .map(str::to_owned)
        .collect();
    let rows = reader
        .deserialize::<Vec<T>>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::csv(path))?;
    Ok((columns, rows))
}
