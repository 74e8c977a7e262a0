//! Level catalog loading.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use munchers_core::{LevelConfig, LevelId};

const SUPPORTED_CATALOG_VERSION: u32 = 1;

const BUILTIN_CATALOG: &str = include_str!("../levels.toml");

/// Ordered set of level configurations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<LevelConfig>,
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    /// Catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG).context("failed to parse the built-in level catalog")
    }

    /// Loads a catalog from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level catalog at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid level catalog at {}", path.display()))
    }

    /// Parses and validates a catalog from TOML contents.
    ///
    /// Levels are sorted by id; duplicate ids and grids below the minimum
    /// size are rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(contents).context("failed to parse level catalog toml contents")?;
        if manifest.version != SUPPORTED_CATALOG_VERSION {
            bail!(
                "unsupported level catalog version {}; expected {}",
                manifest.version,
                SUPPORTED_CATALOG_VERSION
            );
        }
        Self::from_levels(manifest.levels)
    }

    /// Builds a catalog from explicit configurations.
    pub fn from_levels(mut levels: Vec<LevelConfig>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(levels.len());
        for level in &levels {
            if level.id.get() == 0 {
                bail!("level ids start at 1");
            }
            if !seen.insert(level.id) {
                bail!("level catalog contains duplicate entry for level {}", level.id);
            }
            let _ = level
                .grid_size()
                .with_context(|| format!("level {} has an invalid grid", level.id))?;
        }
        levels.sort_by_key(|level| level.id);
        Ok(Self { levels })
    }

    /// Configuration of the provided level.
    #[must_use]
    pub fn get(&self, id: LevelId) -> Option<&LevelConfig> {
        self.levels.iter().find(|level| level.id == id)
    }

    /// Levels ordered by id.
    #[must_use]
    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }

    /// Number of levels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
