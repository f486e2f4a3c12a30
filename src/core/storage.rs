use std::collections::HashMap;

use crate::domain::model::{
    ActionHistoryEntry, ActionRecord, Cluster, Group, GroundPlacesFile, Place, PlaceKind,
};
use crate::utils::error::{GroundPlacesError, Result};

/// Deep copy of the place table, only used to roll back a failed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSnapshot {
    places: Vec<Place>,
}

impl StorageSnapshot {
    pub fn places(&self) -> &[Place] {
        &self.places
    }
}

/// Owns the canonical list of places and the action history log.
///
/// Places keep their insertion order; `index` maps a Gpuid to its position
/// and is rebuilt whenever positions shift.
#[derive(Debug, Default)]
pub struct PlaceStorage {
    places: Vec<Place>,
    index: HashMap<String, usize>,
    history: Vec<ActionHistoryEntry>,
}

impl PlaceStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from the load format, re-attaching every Gpuid.
    pub fn from_file(file: GroundPlacesFile) -> Result<Self> {
        let mut storage = Self::new();
        for (gpuid, record) in file {
            let mut record = match record {
                serde_json::Value::Object(map) => map,
                other => {
                    return Err(GroundPlacesError::ConfigValidationError {
                        field: gpuid,
                        message: format!("expected a place object, found {}", other),
                    })
                }
            };
            record.insert("gpuid".to_string(), serde_json::Value::String(gpuid.clone()));
            let place: Place = serde_json::from_value(serde_json::Value::Object(record))?;
            if storage.contains(&gpuid) {
                return Err(GroundPlacesError::DuplicateId { id: gpuid });
            }
            storage.add(place);
        }
        tracing::debug!("Loaded {} places into storage", storage.len());
        Ok(storage)
    }

    /// Serializes the table back to the load format.
    pub fn to_file(&self) -> Result<GroundPlacesFile> {
        let mut file = GroundPlacesFile::new();
        for place in &self.places {
            let mut value = serde_json::to_value(place)?;
            if let serde_json::Value::Object(map) = &mut value {
                map.remove("gpuid");
            }
            file.insert(place.id().to_string(), value);
        }
        Ok(file)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn contains(&self, gpuid: &str) -> bool {
        self.index.contains_key(gpuid)
    }

    fn get(&self, gpuid: &str, kind: PlaceKind) -> Option<&Place> {
        self.index
            .get(gpuid)
            .map(|&position| &self.places[position])
            .filter(|place| place.kind() == kind)
    }

    /// Returns a copy of the place, failing when it is absent or of another kind.
    pub fn lookup(&self, gpuid: &str, kind: PlaceKind) -> Result<Place> {
        self.get(gpuid, kind)
            .cloned()
            .ok_or_else(|| GroundPlacesError::not_found(kind, gpuid))
    }

    pub fn group(&self, gpuid: &str) -> Result<Group> {
        match self.get(gpuid, PlaceKind::Group) {
            Some(Place::Group(group)) => Ok(group.clone()),
            _ => Err(GroundPlacesError::not_found(PlaceKind::Group, gpuid)),
        }
    }

    pub fn cluster(&self, gpuid: &str) -> Result<Cluster> {
        match self.get(gpuid, PlaceKind::Cluster) {
            Some(Place::Cluster(cluster)) => Ok(cluster.clone()),
            _ => Err(GroundPlacesError::not_found(PlaceKind::Cluster, gpuid)),
        }
    }

    /// Every StopCluster referencing the StopGroup, in table order.
    pub fn parents_of(&self, group_id: &str) -> Vec<&Cluster> {
        self.places
            .iter()
            .filter_map(Place::as_cluster)
            .filter(|cluster| cluster.contains(group_id))
            .collect()
    }

    /// Overwrites the place carrying the same Gpuid.
    pub fn replace(&mut self, place: Place) -> Result<()> {
        let position = *self
            .index
            .get(place.id())
            .ok_or_else(|| GroundPlacesError::not_found(place.kind(), place.id()))?;
        tracing::debug!("Replacing place {}", place.id());
        self.places[position] = place;
        Ok(())
    }

    /// Appends a new place. Uniqueness of the Gpuid is the caller's job.
    pub fn add(&mut self, place: Place) {
        tracing::debug!("Adding {} {}", place.kind().as_str(), place.id());
        self.index.insert(place.id().to_string(), self.places.len());
        self.places.push(place);
    }

    /// Removes an empty place. Deleting a StopGroup also strips its Gpuid
    /// from every StopCluster.
    pub fn delete_if_empty(&mut self, gpuid: &str, kind: PlaceKind) -> Result<()> {
        let place = self
            .get(gpuid, kind)
            .ok_or_else(|| GroundPlacesError::DeleteTargetNotFound {
                kind: kind.as_str(),
                id: gpuid.to_string(),
            })?;

        if place.has_children() {
            return Err(GroundPlacesError::HasChildren {
                kind: kind.as_str(),
                id: gpuid.to_string(),
            });
        }

        self.places.retain(|place| place.id() != gpuid);

        if kind == PlaceKind::Group {
            for place in &mut self.places {
                if let Place::Cluster(cluster) = place {
                    cluster.children.retain(|child| child != gpuid);
                }
            }
        }

        self.rebuild_index();
        tracing::debug!("Deleted {} {}", kind.as_str(), gpuid);
        Ok(())
    }

    pub fn snapshot(&self) -> StorageSnapshot {
        StorageSnapshot {
            places: self.places.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: StorageSnapshot) {
        tracing::debug!("Restoring storage snapshot ({} places)", snapshot.places.len());
        self.places = snapshot.places;
        self.rebuild_index();
    }

    pub fn append_history(&mut self, subject: &str, record: ActionRecord) {
        self.history.push(ActionHistoryEntry {
            subject: subject.to_string(),
            record,
        });
    }

    pub fn history(&self) -> &[ActionHistoryEntry] {
        &self.history
    }

    /// Drops every entry recorded after the first `len` ones.
    pub fn truncate_history(&mut self, len: usize) {
        self.history.truncate(len);
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .places
            .iter()
            .enumerate()
            .map(|(position, place)| (place.id().to_string(), position))
            .collect();
    }
}
