use crate::core::controller::GroundPlacesController;
use crate::domain::model::{
    ActionHistoryEntry, ActionRecord, ActionType, CreatePlaceProperties, UpdatePlaceProperties,
};
use crate::domain::ports::IdGenerator;
use crate::utils::error::{GroundPlacesError, Result};

impl<G: IdGenerator> GroundPlacesController<G> {
    /// Re-applies a recorded action history, all or nothing.
    ///
    /// Each entry goes through the matching public operation, so the history
    /// of this controller grows exactly as if the operations had been called
    /// by hand. When any entry fails, the table and the history are put back
    /// to their state before the call and the error reports the entry index.
    pub fn apply_history(&mut self, entries: &[ActionHistoryEntry]) -> Result<()> {
        if self.storage().is_empty() {
            return Err(GroundPlacesError::NotInitialized);
        }

        tracing::info!("▶️ Replaying {} history entries", entries.len());
        let snapshot = self.storage().snapshot();
        let history_mark = self.history().len();

        for (index, entry) in entries.iter().enumerate() {
            if let Err(e) = self.apply_entry(entry) {
                tracing::warn!(
                    "↩️ History entry #{} ({} on {}) failed, restoring the table",
                    index,
                    entry.record.action.as_str(),
                    entry.subject
                );
                let storage = self.storage_mut();
                storage.restore(snapshot);
                storage.truncate_history(history_mark);
                return Err(GroundPlacesError::HistoryReplay {
                    index,
                    message: e.to_string(),
                });
            }
        }

        tracing::info!("✅ Replayed {} history entries", entries.len());
        Ok(())
    }

    fn apply_entry(&mut self, entry: &ActionHistoryEntry) -> Result<()> {
        let subject = entry.subject.as_str();
        let record = &entry.record;
        tracing::debug!("Replaying {} on {}", record.action.as_str(), subject);

        match record.action {
            ActionType::CreateGroup => {
                let from = required(entry, "from", &record.from)?;
                let params: CreatePlaceProperties = params(entry)?;
                self.create_group(subject, from, params).map(|_| ())
            }
            ActionType::CreateCluster => {
                let params: CreatePlaceProperties = params(entry)?;
                self.create_cluster(subject, params).map(|_| ())
            }
            ActionType::UpdateGroup => {
                let props: UpdatePlaceProperties = params(entry)?;
                self.update_group(subject, props).map(|_| ())
            }
            ActionType::UpdateCluster => {
                let props: UpdatePlaceProperties = params(entry)?;
                self.update_cluster(subject, props).map(|_| ())
            }
            ActionType::AddGroupToCluster => {
                let into = required(entry, "into", &record.into)?;
                self.add_group_to_cluster(subject, into)
            }
            ActionType::RemoveGroupFromCluster => {
                let from = required(entry, "from", &record.from)?;
                self.remove_group_from_cluster(subject, from)
            }
            ActionType::MoveGroup => {
                let (from, into) = from_into(entry, record)?;
                self.move_group(subject, from, into)
            }
            ActionType::MoveProviderStop => {
                let (from, into) = from_into(entry, record)?;
                self.move_provider_stop(subject, from, into)
            }
            ActionType::MergeGroup => {
                let into = required(entry, "into", &record.into)?;
                self.merge_group(subject, into)
            }
            ActionType::MergeCluster => {
                let into = required(entry, "into", &record.into)?;
                self.merge_cluster(subject, into)
            }
            ActionType::DeleteGroup => self.delete_group(subject),
            ActionType::DeleteCluster => self.delete_cluster(subject),
        }
    }
}

fn invalid(entry: &ActionHistoryEntry, field: &'static str) -> GroundPlacesError {
    GroundPlacesError::InvalidHistoryEntry {
        subject: entry.subject.clone(),
        action: entry.record.action.as_str().to_string(),
        field,
    }
}

fn required<'a>(
    entry: &ActionHistoryEntry,
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| invalid(entry, field))
}

fn from_into<'a>(entry: &ActionHistoryEntry, record: &'a ActionRecord) -> Result<(&'a str, &'a str)> {
    Ok((
        required(entry, "from", &record.from)?,
        required(entry, "into", &record.into)?,
    ))
}

fn params<T: serde::de::DeserializeOwned>(entry: &ActionHistoryEntry) -> Result<T> {
    let value = entry
        .record
        .params
        .clone()
        .ok_or_else(|| invalid(entry, "params"))?;
    Ok(serde_json::from_value(value)?)
}
