use std::{
    fs::File,
    io::{self, BufReader},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use spadl::{
    BoxedEventVocabulary, ConvertConfig, CoordinatePolicy, DribbleConfig, MappedVocabulary,
    ProviderFrame, SpadlVocabulary, VocabularyError, VocabularyTables,
};
use spadl_vaep::{
    BoxedFeatureFunction, DEFAULT_FEATURE_IDS, FeatureSetError, LookaheadWindow, PaddingScope,
    select_feature_functions,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ConfigError {
    #[display("failed to open {}: {source}", path.display())]
    #[from(skip)]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse {}: {source}", path.display())]
    #[from(skip)]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("invalid provider frame: pitch dimensions {length} x {width} must be positive")]
    #[from(skip)]
    InvalidFrame { length: f64, width: f64 },
    #[display("invalid vocabulary: {_0}")]
    Vocabulary(VocabularyError),
    #[display("invalid feature set: {_0}")]
    Features(FeatureSetError),
}

/// Settings of a conversion and feature/label run.
///
/// Every field has a default, so an empty JSON object is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Coordinate frame of the raw events.
    pub provider: ProviderFrame,
    pub coordinates: CoordinatePolicy,
    /// `null` disables dribble insertion.
    pub dribbles: Option<DribbleConfig>,
    /// Provider vocabulary tables; canonical SPADL terms when absent.
    pub vocabulary: Option<PathBuf>,
    /// Gamestate window size K.
    pub nb_prev_actions: NonZeroUsize,
    pub padding: PaddingScope,
    pub play_left_to_right: bool,
    /// Feature function ids, in column order.
    pub features: Vec<String>,
    pub labels: LookaheadWindow,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let convert = ConvertConfig::default();
        Self {
            provider: convert.frame,
            coordinates: convert.coordinates,
            dribbles: convert.dribbles,
            vocabulary: None,
            nb_prev_actions: NonZeroUsize::MIN.saturating_add(2),
            padding: PaddingScope::default(),
            play_left_to_right: true,
            features: DEFAULT_FEATURE_IDS.map(str::to_owned).to_vec(),
            labels: LookaheadWindow::default(),
        }
    }
}

fn read_json<T>(path: &Path) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

impl PipelineConfig {
    pub fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that deserialization alone cannot rule out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.provider.has_valid_dimensions() {
            return Err(ConfigError::InvalidFrame {
                length: self.provider.length,
                width: self.provider.width,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn convert_config(&self) -> ConvertConfig {
        ConvertConfig {
            frame: self.provider,
            coordinates: self.coordinates,
            dribbles: self.dribbles,
        }
    }

    pub fn load_vocabulary(&self) -> Result<BoxedEventVocabulary, ConfigError> {
        match &self.vocabulary {
            Some(path) => {
                let tables: VocabularyTables = read_json(path)?;
                Ok(Box::new(MappedVocabulary::from_tables(&tables)?))
            }
            None => Ok(Box::new(SpadlVocabulary)),
        }
    }

    pub fn feature_functions(&self) -> Result<Vec<BoxedFeatureFunction>, ConfigError> {
        Ok(select_feature_functions(
            &self.features,
            self.nb_prev_actions.get(),
        )?)
    }
}
