#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level unlocking, session start and result recording across sessions.

mod catalog;
mod store;

use munchers_core::{Achievement, GridSizeError, LevelId, LevelRecord, SaveData, SessionSummary};
use munchers_system_scoring as scoring;
use munchers_world::Session;
use thiserror::Error;
use tracing::{debug, info};

pub use catalog::LevelCatalog;
pub use store::{MemoryStore, SaveStore};

/// Failures reported by [`Progression`].
#[derive(Debug, Error)]
pub enum ProgressionError {
    /// The catalog has no level with the provided id.
    #[error("level {0} is not in the catalog")]
    UnknownLevel(LevelId),
    /// The level exists but its unlock requirements are not met.
    #[error("level {0} is locked")]
    Locked(LevelId),
    /// The level configuration describes an unusable grid.
    #[error("level {level} has an invalid grid")]
    InvalidGrid {
        /// Level whose configuration was rejected.
        level: LevelId,
        /// Underlying size validation failure.
        #[source]
        source: GridSizeError,
    },
    /// The save store failed.
    #[error("failed to persist progression data: {0:#}")]
    Storage(anyhow::Error),
}

/// Reports whether a level may be started given the persisted progress.
///
/// The first level is always unlocked. Any other level requires the level
/// before it to be completed and the cumulative score to reach the level's
/// optional minimum.
#[must_use]
pub fn is_unlocked(catalog: &LevelCatalog, save: &SaveData, level: LevelId) -> bool {
    let Some(config) = catalog.get(level) else {
        return false;
    };
    let previous_done = match level.previous() {
        Some(previous) => save.is_completed(previous),
        None => true,
    };
    let score_met = config
        .min_total_score
        .map_or(true, |minimum| save.total_score >= minimum);
    previous_done && score_met
}

/// Applies a finished session to the save data.
///
/// Wins update the level record and add the final score to the cumulative
/// total. Returns the achievements unlocked by the session.
pub fn apply_summary(save: &mut SaveData, summary: &SessionSummary) -> Vec<Achievement> {
    if summary.won {
        save.total_score = save.total_score.saturating_add(summary.final_score);
        match save
            .completed_levels
            .iter_mut()
            .find(|record| record.level_id == summary.level_id)
        {
            Some(record) => {
                record.best_score = record.best_score.max(summary.final_score);
                record.best_stars = record.best_stars.max(summary.stars_earned);
                record.completions = record.completions.saturating_add(1);
            }
            None => {
                save.completed_levels.push(LevelRecord {
                    level_id: summary.level_id,
                    best_score: summary.final_score,
                    best_stars: summary.stars_earned,
                    completions: 1,
                });
                save.completed_levels.sort_by_key(|record| record.level_id);
            }
        }
    }

    let unlocked = scoring::achievements(summary, save);
    save.achievements.extend(unlocked.iter().copied());
    save.achievements.sort();
    unlocked
}

/// Campaign state backed by a catalog and a save store.
#[derive(Debug)]
pub struct Progression<S> {
    catalog: LevelCatalog,
    store: S,
    save: SaveData,
}

impl<S> Progression<S>
where
    S: SaveStore,
{
    /// Loads the persisted progress from the store.
    pub fn new(catalog: LevelCatalog, store: S) -> Result<Self, ProgressionError> {
        let save = store.load().map_err(ProgressionError::Storage)?;
        debug!(
            completed = save.completed_levels.len(),
            total_score = save.total_score,
            "loaded progression"
        );
        Ok(Self {
            catalog,
            store,
            save,
        })
    }

    /// Catalog the campaign is played from.
    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Progress recorded so far.
    #[must_use]
    pub fn save_data(&self) -> &SaveData {
        &self.save
    }

    /// Store the progress is persisted to.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reports whether the level may be started.
    #[must_use]
    pub fn is_unlocked(&self, level: LevelId) -> bool {
        is_unlocked(&self.catalog, &self.save, level)
    }

    /// Levels that may currently be started, ordered by id.
    #[must_use]
    pub fn unlocked_levels(&self) -> Vec<LevelId> {
        self.catalog
            .levels()
            .iter()
            .map(|level| level.id)
            .filter(|id| self.is_unlocked(*id))
            .collect()
    }

    /// Starts a session on the provided level.
    pub fn start_level(&self, level: LevelId, seed: u64) -> Result<Session, ProgressionError> {
        let config = self
            .catalog
            .get(level)
            .ok_or(ProgressionError::UnknownLevel(level))?;
        if !self.is_unlocked(level) {
            return Err(ProgressionError::Locked(level));
        }
        let session = Session::level(seed, config.clone())
            .map_err(|source| ProgressionError::InvalidGrid { level, source })?;
        debug!(level = level.get(), seed, "level started");
        Ok(session)
    }

    /// Records a finished session and persists the result.
    ///
    /// Returns the achievements the session unlocked.
    pub fn record(&mut self, summary: &SessionSummary) -> Result<Vec<Achievement>, ProgressionError> {
        if self.catalog.get(summary.level_id).is_none() {
            return Err(ProgressionError::UnknownLevel(summary.level_id));
        }

        let mut next = self.save.clone();
        let unlocked = apply_summary(&mut next, summary);
        self.store.save(&next).map_err(ProgressionError::Storage)?;
        self.save = next;

        if summary.won {
            info!(
                level = summary.level_id.get(),
                score = summary.final_score,
                stars = summary.stars_earned,
                total_score = self.save.total_score,
                "level completed"
            );
        } else {
            info!(
                level = summary.level_id.get(),
                score = summary.final_score,
                "level lost"
            );
        }
        for achievement in &unlocked {
            info!(?achievement, "achievement unlocked");
        }
        Ok(unlocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use munchers_core::ObjectiveId;

    fn summary(level: u32, won: bool, final_score: u64) -> SessionSummary {
        SessionSummary {
            level_id: LevelId::new(level),
            won,
            final_score,
            accuracy: 100,
            stars_earned: if won { 2 } else { 0 },
            completed_objective_ids: vec![ObjectiveId::new("clear")],
            mistakes: 1,
            best_streak: 4,
            time_remaining: Some(10),
            time_limit: Some(120),
            duration_ms: 110_000,
        }
    }

    #[test]
    fn wins_update_records_and_totals() {
        let mut save = SaveData::default();
        let unlocked = apply_summary(&mut save, &summary(2, true, 150));
        assert_eq!(unlocked, vec![Achievement::FirstVictory]);
        assert_eq!(save.total_score, 150);

        let _ = apply_summary(&mut save, &summary(1, true, 90));
        let again = apply_summary(&mut save, &summary(2, true, 120));
        assert!(again.is_empty());

        let ids: Vec<u32> = save
            .completed_levels
            .iter()
            .map(|record| record.level_id.get())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        let record = save.record(LevelId::new(2)).expect("record");
        assert_eq!(record.best_score, 150);
        assert_eq!(record.completions, 2);
        assert_eq!(save.total_score, 360);
    }

    #[test]
    fn losses_leave_progress_untouched() {
        let mut save = SaveData::default();
        let unlocked = apply_summary(&mut save, &summary(1, false, 40));
        assert!(unlocked.is_empty());
        assert_eq!(save, SaveData::default());
    }

    #[test]
    fn unlocks_follow_completion_and_minimum_score() {
        let catalog = LevelCatalog::builtin().expect("builtin catalog");
        let mut save = SaveData::default();
        assert!(is_unlocked(&catalog, &save, LevelId::new(1)));
        assert!(!is_unlocked(&catalog, &save, LevelId::new(2)));
        assert!(!is_unlocked(&catalog, &save, LevelId::new(99)));

        for level in 1..=3 {
            let _ = apply_summary(&mut save, &summary(level, true, 50));
        }
        assert!(is_unlocked(&catalog, &save, LevelId::new(3)));
        assert_eq!(save.total_score, 150);
        assert!(!is_unlocked(&catalog, &save, LevelId::new(4)));

        let _ = apply_summary(&mut save, &summary(3, true, 50));
        assert!(is_unlocked(&catalog, &save, LevelId::new(4)));
    }
}
