//! Progression gating over the level store: which mission is active,
//! whether its credential may be edited, and when the next mission opens.

use shared::{
    domain::{Level, LevelIndex, FINAL_LEVEL},
    error::TrackerError,
};
use storage::LevelStore;
use tracing::info;

/// Snapshot the presentation layer renders after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentView {
    pub level: Option<Level>,
    pub editable: bool,
}

/// Whether a new mission may be created right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAvailability {
    /// The latest credential looks plausible; the next index may be deployed.
    Ready { next: LevelIndex },
    /// The latest mission has no usable credential yet.
    Locked,
    /// All 34 missions exist; progression is complete.
    AllDeployed,
}

/// Session-scoped state over the durable level set. Holds the selection
/// and the edit lock; everything else is recomputed from the store.
pub struct ProgressionController {
    store: LevelStore,
    selected: Option<LevelIndex>,
    edit_unlocked: bool,
}

impl ProgressionController {
    pub fn new(store: LevelStore) -> Self {
        Self {
            store,
            selected: None,
            edit_unlocked: false,
        }
    }

    pub fn selected(&self) -> Option<LevelIndex> {
        self.selected
    }

    pub fn edit_unlocked(&self) -> bool {
        self.edit_unlocked
    }

    pub async fn levels(&self) -> Result<Vec<Level>, TrackerError> {
        self.store.list_levels().await.map_err(storage_error)
    }

    pub async fn select(&mut self, index: LevelIndex) -> Result<CurrentView, TrackerError> {
        let level = self
            .store
            .level(index)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| TrackerError::validation(format!("no stored mission {index}")))?;
        self.selected = Some(index);
        // Captured credentials load read-only; unlock_edit is the
        // explicit override.
        self.edit_unlocked = !level.captured();
        Ok(CurrentView {
            editable: self.edit_unlocked,
            level: Some(level),
        })
    }

    pub fn unlock_edit(&mut self) -> Result<(), TrackerError> {
        if self.selected.is_none() {
            return Err(TrackerError::forbidden("no mission selected"));
        }
        self.edit_unlocked = true;
        Ok(())
    }

    /// Persists the credential as typed (trim applies to the blank check,
    /// not to storage) and re-locks editing; only `unlock_edit` releases
    /// the lock again.
    pub async fn save_credential(&mut self, text: &str) -> Result<(), TrackerError> {
        let Some(index) = self.selected else {
            return Err(TrackerError::forbidden("no mission selected"));
        };
        if text.trim().is_empty() {
            return Err(TrackerError::validation("credential cannot be blank"));
        }
        self.store
            .upsert_level(&Level::new(index, text))
            .await
            .map_err(storage_error)?;
        self.edit_unlocked = false;
        info!(%index, "credential saved");
        Ok(())
    }

    /// Deletes the selection and falls back to the highest remaining
    /// mission. Mission 0 is protected.
    pub async fn delete_selected(&mut self) -> Result<CurrentView, TrackerError> {
        let Some(index) = self.selected else {
            return Err(TrackerError::forbidden("no mission selected"));
        };
        if index.is_origin() {
            return Err(TrackerError::forbidden("mission 0 cannot be deleted"));
        }
        self.store
            .delete_level(index)
            .await
            .map_err(storage_error)?;
        info!(%index, "mission deleted");

        let remaining = self.store.list_levels().await.map_err(storage_error)?;
        match remaining.last() {
            Some(last) => self.select(last.index).await,
            None => {
                self.selected = None;
                self.edit_unlocked = false;
                Ok(CurrentView {
                    level: None,
                    editable: false,
                })
            }
        }
    }

    pub async fn next_availability(&self) -> Result<NextAvailability, TrackerError> {
        let levels = self.store.list_levels().await.map_err(storage_error)?;
        Ok(availability_for(levels.last()))
    }

    /// Creates the next mission with an empty credential, selects it, and
    /// opens it for editing.
    pub async fn advance(&mut self) -> Result<CurrentView, TrackerError> {
        let levels = self.store.list_levels().await.map_err(storage_error)?;
        let next = match availability_for(levels.last()) {
            NextAvailability::Ready { next } => next,
            NextAvailability::AllDeployed => {
                return Err(TrackerError::forbidden("all missions are already deployed"));
            }
            NextAvailability::Locked => {
                return Err(TrackerError::forbidden(
                    "save a credential for the current mission first",
                ));
            }
        };

        let level = Level::new(next, "");
        self.store
            .upsert_level(&level)
            .await
            .map_err(storage_error)?;
        self.selected = Some(next);
        self.edit_unlocked = true;
        info!(index = %next, "mission deployed");
        Ok(CurrentView {
            level: Some(level),
            editable: true,
        })
    }

    pub async fn current_view(&self) -> Result<CurrentView, TrackerError> {
        let level = match self.selected {
            Some(index) => self.store.level(index).await.map_err(storage_error)?,
            None => None,
        };
        Ok(CurrentView {
            level,
            editable: self.edit_unlocked,
        })
    }
}

fn availability_for(last: Option<&Level>) -> NextAvailability {
    let Some(last) = last else {
        // Only reachable transiently before seeding.
        return NextAvailability::Locked;
    };
    if last.index >= FINAL_LEVEL {
        return NextAvailability::AllDeployed;
    }
    if last.plausible_credential() {
        NextAvailability::Ready {
            next: last.index.next(),
        }
    } else {
        NextAvailability::Locked
    }
}

fn storage_error(err: anyhow::Error) -> TrackerError {
    TrackerError::storage(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
