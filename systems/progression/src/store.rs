//! Storage port for persisted progression data.

use anyhow::Result;
use munchers_core::SaveData;

/// Loads and persists [`SaveData`] on behalf of [`crate::Progression`].
pub trait SaveStore {
    /// Reads the persisted data, returning defaults when nothing was saved.
    fn load(&self) -> Result<SaveData>;

    /// Persists the provided data, replacing whatever was stored before.
    fn save(&mut self, data: &SaveData) -> Result<()>;
}

/// Store that keeps the data in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Option<SaveData>,
    writes: usize,
}

impl MemoryStore {
    /// Creates a store pre-populated with the provided data.
    #[must_use]
    pub fn with_data(data: SaveData) -> Self {
        Self {
            data: Some(data),
            writes: 0,
        }
    }

    /// Last data written or seeded.
    #[must_use]
    pub fn data(&self) -> Option<&SaveData> {
        self.data.as_ref()
    }

    /// Number of successful writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SaveStore for MemoryStore {
    fn load(&self) -> Result<SaveData> {
        Ok(self.data.clone().unwrap_or_default())
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        self.data = Some(data.clone());
        self.writes += 1;
        Ok(())
    }
}

impl<S> SaveStore for &mut S
where
    S: SaveStore + ?Sized,
{
    fn load(&self) -> Result<SaveData> {
        (**self).load()
    }

    fn save(&mut self, data: &SaveData) -> Result<()> {
        (**self).save(data)
    }
}
