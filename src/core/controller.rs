use std::sync::{Arc, Mutex};

use crate::core::autocomplete;
use crate::core::distance::ensure_within_limit;
use crate::core::gpuid::GpuidGenerator;
use crate::core::storage::PlaceStorage;
use crate::domain::model::{
    ActionHistoryEntry, ActionRecord, ActionType, AutocompleteFilter, Cluster,
    CreatePlaceProperties, Group, GroundPlacesFile, Place, PlaceKind, Serviced,
    UpdatePlaceProperties,
};
use crate::domain::ports::{GeneratedGpuid, GpuidRequest, IdGenerator};
use crate::utils::error::{GroundPlacesError, Result};
use crate::utils::validation::{require_property, validate_cluster_name, validate_coordinates};

const CREATE_GROUP_CONTEXT: &str = "creating a new StopGroup";
const CREATE_GROUP_REQUIRED: &str =
    "segmentProviderStopId, fromStopGroupGpuid, countryCode, latitude, longitude and name";
const CREATE_CLUSTER_CONTEXT: &str = "creating a new StopCluster";
const CREATE_CLUSTER_REQUIRED: &str = "fromStopGroupGpuid, countryCode, latitude, longitude and name";
const UPDATE_REQUIRED: &str = "a value for every property given";

/// Mutation engine over one place table.
///
/// Every public operation runs inside [`GroundPlacesController::transaction`]:
/// the table is snapshotted, the `apply_*` steps run, and any error restores
/// the snapshot before being returned. On success exactly one history entry
/// is appended. The `apply_*` methods never record history so composite
/// operations can chain them.
pub struct GroundPlacesController<G: IdGenerator = GpuidGenerator> {
    storage: PlaceStorage,
    id_generator: G,
}

impl GroundPlacesController<GpuidGenerator> {
    pub fn new() -> Self {
        Self::with_id_generator(GpuidGenerator::new())
    }
}

impl Default for GroundPlacesController<GpuidGenerator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> GroundPlacesController<G> {
    pub fn with_id_generator(id_generator: G) -> Self {
        Self {
            storage: PlaceStorage::new(),
            id_generator,
        }
    }

    /// Loads a GroundPlaces file, replacing the current table and history.
    pub fn init(&mut self, file: GroundPlacesFile) -> Result<()> {
        self.storage = PlaceStorage::from_file(file)?;
        tracing::info!("📥 Loaded {} ground places", self.storage.len());
        Ok(())
    }

    pub fn storage(&self) -> &PlaceStorage {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut PlaceStorage {
        &mut self.storage
    }

    pub fn places(&self) -> &[Place] {
        self.storage.places()
    }

    pub fn history(&self) -> &[ActionHistoryEntry] {
        self.storage.history()
    }

    pub fn to_file(&self) -> Result<GroundPlacesFile> {
        self.storage.to_file()
    }

    pub fn get_group(&self, gpuid: &str) -> Result<Group> {
        self.storage.group(gpuid)
    }

    pub fn get_cluster(&self, gpuid: &str) -> Result<Cluster> {
        self.storage.cluster(gpuid)
    }

    pub fn autocomplete(&self, query: &str, filters: &[AutocompleteFilter]) -> Vec<Place> {
        autocomplete::search(self.storage.places(), query, filters)
    }

    pub(crate) fn transaction<T>(
        &mut self,
        action: ActionType,
        operation: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.storage.snapshot();
        match operation(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("↩️ {} failed, rolling back: {}", action.as_str(), e);
                self.storage.restore(snapshot);
                Err(e)
            }
        }
    }

    fn commit(&mut self, subject: &str, record: ActionRecord) {
        tracing::info!("✅ {} committed on {}", record.action.as_str(), subject);
        self.storage.append_history(subject, record);
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Creates a StopGroup around the SegmentProviderStop `stop_id` taken out
    /// of `from_group_id`, attached to every parent of `from_group_id`.
    pub fn create_group(
        &mut self,
        stop_id: &str,
        from_group_id: &str,
        params: CreatePlaceProperties,
    ) -> Result<Group> {
        let record = ActionRecord::new(ActionType::CreateGroup)
            .with_from(from_group_id)
            .with_params(serde_json::to_value(&params)?);

        let group = self.transaction(ActionType::CreateGroup, |this| {
            this.apply_create_group(stop_id, from_group_id, &params)
        })?;
        self.commit(stop_id, record);
        Ok(group)
    }

    /// Creates a StopCluster whose only child is `from_group_id`.
    pub fn create_cluster(
        &mut self,
        from_group_id: &str,
        params: CreatePlaceProperties,
    ) -> Result<Cluster> {
        let record = ActionRecord::new(ActionType::CreateCluster)
            .with_params(serde_json::to_value(&params)?);

        let cluster = self.transaction(ActionType::CreateCluster, |this| {
            this.apply_create_cluster(from_group_id, &params)
        })?;
        self.commit(from_group_id, record);
        Ok(cluster)
    }

    pub fn update_group(&mut self, gpuid: &str, props: UpdatePlaceProperties) -> Result<Group> {
        let record =
            ActionRecord::new(ActionType::UpdateGroup).with_params(serde_json::to_value(&props)?);

        let group = self.transaction(ActionType::UpdateGroup, |this| {
            this.apply_update_group(gpuid, &props)
        })?;
        self.commit(gpuid, record);
        Ok(group)
    }

    pub fn update_cluster(&mut self, gpuid: &str, props: UpdatePlaceProperties) -> Result<Cluster> {
        let record = ActionRecord::new(ActionType::UpdateCluster)
            .with_params(serde_json::to_value(&props)?);

        let cluster = self.transaction(ActionType::UpdateCluster, |this| {
            this.apply_update_cluster(gpuid, &props)
        })?;
        self.commit(gpuid, record);
        Ok(cluster)
    }

    pub fn add_group_to_cluster(&mut self, group_id: &str, cluster_id: &str) -> Result<()> {
        self.transaction(ActionType::AddGroupToCluster, |this| {
            this.apply_add_group_to_cluster(group_id, cluster_id)
        })?;
        self.commit(
            group_id,
            ActionRecord::new(ActionType::AddGroupToCluster).with_into(cluster_id),
        );
        Ok(())
    }

    pub fn remove_group_from_cluster(&mut self, group_id: &str, cluster_id: &str) -> Result<()> {
        self.transaction(ActionType::RemoveGroupFromCluster, |this| {
            this.apply_remove_group_from_cluster(group_id, cluster_id)
        })?;
        self.commit(
            group_id,
            ActionRecord::new(ActionType::RemoveGroupFromCluster).with_from(cluster_id),
        );
        Ok(())
    }

    pub fn move_group(
        &mut self,
        group_id: &str,
        from_cluster_id: &str,
        into_cluster_id: &str,
    ) -> Result<()> {
        self.transaction(ActionType::MoveGroup, |this| {
            this.apply_move_group(group_id, from_cluster_id, into_cluster_id)
        })?;
        self.commit(
            group_id,
            ActionRecord::new(ActionType::MoveGroup)
                .with_from(from_cluster_id)
                .with_into(into_cluster_id),
        );
        Ok(())
    }

    pub fn move_provider_stop(
        &mut self,
        stop_id: &str,
        from_group_id: &str,
        into_group_id: &str,
    ) -> Result<()> {
        self.transaction(ActionType::MoveProviderStop, |this| {
            this.apply_move_provider_stop(stop_id, from_group_id, into_group_id)
        })?;
        self.commit(
            stop_id,
            ActionRecord::new(ActionType::MoveProviderStop)
                .with_from(from_group_id)
                .with_into(into_group_id),
        );
        Ok(())
    }

    /// Moves every SegmentProviderStop of `to_merge_id` into `into_id`.
    pub fn merge_group(&mut self, to_merge_id: &str, into_id: &str) -> Result<()> {
        self.transaction(ActionType::MergeGroup, |this| {
            this.apply_merge_group(to_merge_id, into_id)
        })?;
        self.commit(
            to_merge_id,
            ActionRecord::new(ActionType::MergeGroup).with_into(into_id),
        );
        Ok(())
    }

    /// Moves every StopGroup of `to_merge_id` into `into_id`. A StopGroup that
    /// already belongs to both is only detached from `to_merge_id`.
    pub fn merge_cluster(&mut self, to_merge_id: &str, into_id: &str) -> Result<()> {
        self.transaction(ActionType::MergeCluster, |this| {
            this.apply_merge_cluster(to_merge_id, into_id)
        })?;
        self.commit(
            to_merge_id,
            ActionRecord::new(ActionType::MergeCluster).with_into(into_id),
        );
        Ok(())
    }

    pub fn delete_group(&mut self, gpuid: &str) -> Result<()> {
        self.transaction(ActionType::DeleteGroup, |this| {
            this.storage.delete_if_empty(gpuid, PlaceKind::Group)
        })?;
        self.commit(gpuid, ActionRecord::new(ActionType::DeleteGroup));
        Ok(())
    }

    pub fn delete_cluster(&mut self, gpuid: &str) -> Result<()> {
        self.transaction(ActionType::DeleteCluster, |this| {
            this.storage.delete_if_empty(gpuid, PlaceKind::Cluster)
        })?;
        self.commit(gpuid, ActionRecord::new(ActionType::DeleteCluster));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Steps without history
    // ------------------------------------------------------------------

    fn generate_gpuid(
        &self,
        kind: PlaceKind,
        context: &str,
        required: &str,
        params: &CreatePlaceProperties,
    ) -> Result<GeneratedGpuid> {
        let country_code = require_property(context, required, "countryCode", &params.country_code)?;
        let name = require_property(context, required, "name", &params.name)?;
        let latitude = *require_property(context, required, "latitude", &params.latitude)?;
        let longitude = *require_property(context, required, "longitude", &params.longitude)?;
        validate_coordinates(latitude, longitude)?;

        let generated = self.id_generator.generate(&GpuidRequest {
            name: name.clone(),
            latitude,
            longitude,
            country_code: country_code.clone(),
            kind,
        });

        if self.storage.contains(&generated.id) {
            return Err(GroundPlacesError::DuplicateId { id: generated.id });
        }
        Ok(generated)
    }

    fn apply_create_group(
        &mut self,
        stop_id: &str,
        from_group_id: &str,
        params: &CreatePlaceProperties,
    ) -> Result<Group> {
        let generated = self.generate_gpuid(
            PlaceKind::Group,
            CREATE_GROUP_CONTEXT,
            CREATE_GROUP_REQUIRED,
            params,
        )?;
        self.storage.group(from_group_id)?;

        let group = Group {
            gpuid: generated.id.clone(),
            country_code: generated.country_code,
            name: generated.name,
            latitude: generated.latitude,
            longitude: generated.longitude,
            children: Vec::new(),
            serviced: Some(params.serviced.unwrap_or(Serviced::False)),
            has_been_modified: None,
            warning: None,
            is_latest: None,
        };
        self.storage.add(Place::Group(group));

        self.apply_move_provider_stop(stop_id, from_group_id, &generated.id)?;

        let parents: Vec<String> = self
            .storage
            .parents_of(from_group_id)
            .into_iter()
            .map(|cluster| cluster.gpuid.clone())
            .collect();
        for parent in parents {
            self.apply_add_group_to_cluster(&generated.id, &parent)?;
        }

        self.storage.group(&generated.id)
    }

    fn apply_create_cluster(
        &mut self,
        from_group_id: &str,
        params: &CreatePlaceProperties,
    ) -> Result<Cluster> {
        let generated = self.generate_gpuid(
            PlaceKind::Cluster,
            CREATE_CLUSTER_CONTEXT,
            CREATE_CLUSTER_REQUIRED,
            params,
        )?;
        let group = self.storage.group(from_group_id)?;

        let cluster = Cluster {
            gpuid: generated.id,
            unique_name: None,
            country_code: generated.country_code,
            name: generated.name,
            latitude: generated.latitude,
            longitude: generated.longitude,
            children: vec![group.gpuid.clone()],
            serviced: Some(params.serviced.unwrap_or(Serviced::False)),
            has_been_modified: None,
            warning: None,
            is_latest: None,
        };

        ensure_within_limit(
            &group.gpuid,
            group.coordinates(),
            &cluster.gpuid,
            cluster.coordinates(),
        )?;

        self.storage.add(Place::Cluster(cluster.clone()));
        Ok(cluster)
    }

    fn apply_update_group(&mut self, gpuid: &str, props: &UpdatePlaceProperties) -> Result<Group> {
        let mut group = self.storage.group(gpuid)?;
        merge_properties(
            PlaceKind::Group,
            gpuid,
            props,
            &mut group.name,
            &mut group.latitude,
            &mut group.longitude,
            &mut group.serviced,
        )?;

        if props.moves_place() {
            for parent in self.storage.parents_of(gpuid) {
                ensure_within_limit(
                    gpuid,
                    group.coordinates(),
                    &parent.gpuid,
                    parent.coordinates(),
                )?;
            }
        }

        self.storage.replace(Place::Group(group.clone()))?;
        Ok(group)
    }

    fn apply_update_cluster(
        &mut self,
        gpuid: &str,
        props: &UpdatePlaceProperties,
    ) -> Result<Cluster> {
        let mut cluster = self.storage.cluster(gpuid)?;
        merge_properties(
            PlaceKind::Cluster,
            gpuid,
            props,
            &mut cluster.name,
            &mut cluster.latitude,
            &mut cluster.longitude,
            &mut cluster.serviced,
        )?;
        if props.name.is_some() {
            validate_cluster_name(&cluster.name)?;
        }

        if props.moves_place() {
            for child in &cluster.children {
                let group = self.storage.group(child)?;
                ensure_within_limit(
                    &group.gpuid,
                    group.coordinates(),
                    gpuid,
                    cluster.coordinates(),
                )?;
            }
        }

        self.storage.replace(Place::Cluster(cluster.clone()))?;
        Ok(cluster)
    }

    pub(crate) fn apply_add_group_to_cluster(&mut self, group_id: &str, cluster_id: &str) -> Result<()> {
        let group = self.storage.group(group_id)?;
        let mut cluster = self.storage.cluster(cluster_id)?;

        if cluster.contains(group_id) {
            return Err(GroundPlacesError::AlreadyMember {
                group_id: group_id.to_string(),
                cluster_id: cluster_id.to_string(),
            });
        }

        ensure_within_limit(
            group_id,
            group.coordinates(),
            cluster_id,
            cluster.coordinates(),
        )?;

        cluster.children.push(group_id.to_string());
        self.storage.replace(Place::Cluster(cluster))
    }

    pub(crate) fn apply_remove_group_from_cluster(
        &mut self,
        group_id: &str,
        cluster_id: &str,
    ) -> Result<()> {
        self.storage.group(group_id)?;
        let mut cluster = self.storage.cluster(cluster_id)?;

        let position = cluster
            .children
            .iter()
            .position(|child| child == group_id)
            .ok_or_else(|| GroundPlacesError::NotMember {
                group_id: group_id.to_string(),
                cluster_id: cluster_id.to_string(),
            })?;
        cluster.children.remove(position);
        self.storage.replace(Place::Cluster(cluster))?;

        if self.storage.parents_of(group_id).is_empty() {
            return Err(GroundPlacesError::WouldOrphan {
                group_id: group_id.to_string(),
            });
        }
        Ok(())
    }

    fn apply_move_group(
        &mut self,
        group_id: &str,
        from_cluster_id: &str,
        into_cluster_id: &str,
    ) -> Result<()> {
        if from_cluster_id == into_cluster_id {
            return Err(GroundPlacesError::no_op(format!(
                "You can't move the StopGroup with the Gpuid \"{}\" because the new StopCluster parent is the same as before.",
                group_id
            )));
        }
        self.storage.cluster(from_cluster_id)?;
        self.storage.cluster(into_cluster_id)?;

        self.apply_add_group_to_cluster(group_id, into_cluster_id)?;
        self.apply_remove_group_from_cluster(group_id, from_cluster_id)
    }

    fn apply_move_provider_stop(
        &mut self,
        stop_id: &str,
        from_group_id: &str,
        into_group_id: &str,
    ) -> Result<()> {
        if from_group_id == into_group_id {
            return Err(GroundPlacesError::no_op(format!(
                "You can't move the SegmentProviderStop with the ID \"{}\" because the new StopGroup parent is the same as before.",
                stop_id
            )));
        }

        let mut source = self.storage.group(from_group_id)?;
        let mut destination = self.storage.group(into_group_id)?;

        let position =
            source
                .stop_position(stop_id)
                .ok_or_else(|| GroundPlacesError::StopNotFound {
                    stop_id: stop_id.to_string(),
                    group_id: from_group_id.to_string(),
                })?;

        let company_name = &source.children[position].company_name;
        if destination.hosts_company(company_name) {
            return Err(GroundPlacesError::DuplicateCompany {
                stop_id: stop_id.to_string(),
                group_id: into_group_id.to_string(),
                company_name: company_name.clone(),
            });
        }

        ensure_within_limit(
            from_group_id,
            source.coordinates(),
            into_group_id,
            destination.coordinates(),
        )?;

        let stop = source.children.remove(position);
        destination.children.push(stop);
        self.storage.replace(Place::Group(source))?;
        self.storage.replace(Place::Group(destination))
    }

    fn apply_merge_group(&mut self, to_merge_id: &str, into_id: &str) -> Result<()> {
        if to_merge_id == into_id {
            return Err(GroundPlacesError::no_op(format!(
                "You can't \"merge\" these two StopGroup with the Gpuid \"{}\" because they are the same.",
                to_merge_id
            )));
        }

        let source = self.storage.group(to_merge_id)?;
        self.storage.group(into_id)?;

        if source.children.is_empty() {
            return Err(GroundPlacesError::NothingToMerge {
                group_id: to_merge_id.to_string(),
            });
        }

        for stop in &source.children {
            self.apply_move_provider_stop(&stop.id, to_merge_id, into_id)?;
        }
        Ok(())
    }

    fn apply_merge_cluster(&mut self, to_merge_id: &str, into_id: &str) -> Result<()> {
        if to_merge_id == into_id {
            return Err(GroundPlacesError::no_op(format!(
                "You can't \"merge\" these two StopCluster with the Gpuid \"{}\" because they are the same.",
                to_merge_id
            )));
        }

        let source = self.storage.cluster(to_merge_id)?;
        self.storage.cluster(into_id)?;

        for group_id in &source.children {
            if self.storage.cluster(into_id)?.contains(group_id) {
                self.apply_remove_group_from_cluster(group_id, to_merge_id)?;
            } else {
                self.apply_move_group(group_id, to_merge_id, into_id)?;
            }
        }
        Ok(())
    }
}

fn merge_properties(
    kind: PlaceKind,
    gpuid: &str,
    props: &UpdatePlaceProperties,
    name: &mut String,
    latitude: &mut f64,
    longitude: &mut f64,
    serviced: &mut Option<Serviced>,
) -> Result<()> {
    if props.is_empty() {
        return Err(GroundPlacesError::no_op(format!(
            "You can't update the {} with the Gpuid \"{}\" because no property is given.",
            kind, gpuid
        )));
    }

    let context = format!("updating the {} with the Gpuid \"{}\"", kind, gpuid);
    if let Some(value) = &props.name {
        *name = require_property(&context, UPDATE_REQUIRED, "name", value)?.clone();
    }
    if let Some(value) = &props.latitude {
        *latitude = *require_property(&context, UPDATE_REQUIRED, "latitude", value)?;
    }
    if let Some(value) = &props.longitude {
        *longitude = *require_property(&context, UPDATE_REQUIRED, "longitude", value)?;
    }
    if let Some(value) = &props.serviced {
        *serviced = Some(*require_property(&context, UPDATE_REQUIRED, "serviced", value)?);
    }

    if props.moves_place() {
        validate_coordinates(*latitude, *longitude)?;
    }
    Ok(())
}

/// Controller behind a single lock: each public operation, and a whole
/// replay, runs while holding it.
pub struct SharedController<G: IdGenerator = GpuidGenerator> {
    inner: Arc<Mutex<GroundPlacesController<G>>>,
}

impl<G: IdGenerator> Clone for SharedController<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: IdGenerator> SharedController<G> {
    pub fn new(controller: GroundPlacesController<G>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub fn with<T>(
        &self,
        operation: impl FnOnce(&mut GroundPlacesController<G>) -> Result<T>,
    ) -> Result<T> {
        let mut controller = self
            .inner
            .lock()
            .map_err(|_| GroundPlacesError::LockPoisoned)?;
        operation(&mut *controller)
    }
}
