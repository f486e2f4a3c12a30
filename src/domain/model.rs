use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Raw load format: Gpuid -> place record without its `gpuid` field.
pub type GroundPlacesFile = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    Group,
    Cluster,
}

impl PlaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceKind::Group => "group",
            PlaceKind::Cluster => "cluster",
        }
    }

    /// Prefix of every Gpuid of this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            PlaceKind::Group => "g|",
            PlaceKind::Cluster => "c|",
        }
    }
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceKind::Group => write!(f, "StopGroup"),
            PlaceKind::Cluster => write!(f, "StopCluster"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Serviced {
    #[serde(rename = "True")]
    True,
    #[serde(rename = "False")]
    False,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStop {
    #[serde(default)]
    pub unique_name: Option<String>,
    pub company_name: String,
    pub name: String,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serviced: Option<Serviced>,
    pub company_id: u64,
    pub longitude: f64,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub gpuid: String,
    pub country_code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "childs", alias = "children", default)]
    pub children: Vec<ProviderStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serviced: Option<Serviced>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_been_modified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_latest: Option<bool>,
}

impl Group {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn stop_position(&self, stop_id: &str) -> Option<usize> {
        self.children.iter().position(|stop| stop.id == stop_id)
    }

    pub fn hosts_company(&self, company_name: &str) -> bool {
        self.children
            .iter()
            .any(|stop| stop.company_name == company_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub gpuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    pub country_code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "childs", alias = "children", default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serviced: Option<Serviced>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_been_modified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_latest: Option<bool>,
}

impl Cluster {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn contains(&self, group_id: &str) -> bool {
        self.children.iter().any(|child| child == group_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Place {
    Group(Group),
    Cluster(Cluster),
}

impl Place {
    pub fn id(&self) -> &str {
        match self {
            Place::Group(group) => &group.gpuid,
            Place::Cluster(cluster) => &cluster.gpuid,
        }
    }

    pub fn kind(&self) -> PlaceKind {
        match self {
            Place::Group(_) => PlaceKind::Group,
            Place::Cluster(_) => PlaceKind::Cluster,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Place::Group(group) => &group.name,
            Place::Cluster(cluster) => &cluster.name,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        match self {
            Place::Group(group) => group.coordinates(),
            Place::Cluster(cluster) => cluster.coordinates(),
        }
    }

    pub fn serviced(&self) -> Option<Serviced> {
        match self {
            Place::Group(group) => group.serviced,
            Place::Cluster(cluster) => cluster.serviced,
        }
    }

    pub fn has_children(&self) -> bool {
        match self {
            Place::Group(group) => !group.children.is_empty(),
            Place::Cluster(cluster) => !cluster.children.is_empty(),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Place::Group(group) => Some(group),
            Place::Cluster(_) => None,
        }
    }

    pub fn as_cluster(&self) -> Option<&Cluster> {
        match self {
            Place::Cluster(cluster) => Some(cluster),
            Place::Group(_) => None,
        }
    }
}

/// Properties used by `createGroup` / `createCluster`. Every field is
/// optional on the wire so that a missing one is reported by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serviced: Option<Serviced>,
}

impl CreatePlaceProperties {
    pub fn new(country_code: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            country_code: Some(country_code.to_string()),
            name: Some(name.to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            serviced: None,
        }
    }
}

fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Properties used by `updateGroup` / `updateCluster`.
///
/// The outer `Option` tells whether the property was given at all, the inner
/// one whether it carried a value. `Some(None)` is an explicit property
/// without value and is rejected by the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlaceProperties {
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "explicit", skip_serializing_if = "Option::is_none")]
    pub serviced: Option<Option<Serviced>>,
}

impl UpdatePlaceProperties {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(Some(name.to_string()));
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(Some(latitude));
        self.longitude = Some(Some(longitude));
        self
    }

    pub fn with_serviced(mut self, serviced: Serviced) -> Self {
        self.serviced = Some(Some(serviced));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.serviced.is_none()
    }

    pub fn moves_place(&self) -> bool {
        self.latitude.is_some() || self.longitude.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    CreateGroup,
    CreateCluster,
    UpdateGroup,
    UpdateCluster,
    AddGroupToCluster,
    RemoveGroupFromCluster,
    MoveGroup,
    MoveProviderStop,
    MergeGroup,
    MergeCluster,
    DeleteGroup,
    DeleteCluster,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateGroup => "createGroup",
            ActionType::CreateCluster => "createCluster",
            ActionType::UpdateGroup => "updateGroup",
            ActionType::UpdateCluster => "updateCluster",
            ActionType::AddGroupToCluster => "addGroupToCluster",
            ActionType::RemoveGroupFromCluster => "removeGroupFromCluster",
            ActionType::MoveGroup => "moveGroup",
            ActionType::MoveProviderStop => "moveProviderStop",
            ActionType::MergeGroup => "mergeGroup",
            ActionType::MergeCluster => "mergeCluster",
            ActionType::DeleteGroup => "deleteGroup",
            ActionType::DeleteCluster => "deleteCluster",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(rename = "type")]
    pub action: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub into: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl ActionRecord {
    pub fn new(action: ActionType) -> Self {
        Self {
            action,
            from: None,
            into: None,
            params: None,
        }
    }

    pub fn with_from(mut self, from: &str) -> Self {
        self.from = Some(from.to_string());
        self
    }

    pub fn with_into(mut self, into: &str) -> Self {
        self.into = Some(into.to_string());
        self
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// One committed mutation, serialized as `{ "<subject>": { "type": ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<String, ActionRecord>",
    try_from = "BTreeMap<String, ActionRecord>"
)]
pub struct ActionHistoryEntry {
    pub subject: String,
    pub record: ActionRecord,
}

impl From<ActionHistoryEntry> for BTreeMap<String, ActionRecord> {
    fn from(entry: ActionHistoryEntry) -> Self {
        BTreeMap::from([(entry.subject, entry.record)])
    }
}

impl TryFrom<BTreeMap<String, ActionRecord>> for ActionHistoryEntry {
    type Error = String;

    fn try_from(map: BTreeMap<String, ActionRecord>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "an action history entry must have exactly one subject, found {}",
                map.len()
            ));
        }
        let (subject, record) = map
            .into_iter()
            .next()
            .ok_or_else(|| "empty action history entry".to_string())?;
        Ok(Self { subject, record })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutocompleteFilter {
    StopGroup,
    StopCluster,
    Serviced,
    SegmentProviderStop,
}

impl FromStr for AutocompleteFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "stopGroup" | "group" => Ok(AutocompleteFilter::StopGroup),
            "stopCluster" | "cluster" => Ok(AutocompleteFilter::StopCluster),
            "serviced" => Ok(AutocompleteFilter::Serviced),
            "segmentProviderStop" | "providerStop" => Ok(AutocompleteFilter::SegmentProviderStop),
            other => Err(format!("unknown autocomplete filter: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_entry_wire_format() {
        let entry = ActionHistoryEntry {
            subject: "g|FRstrasbou@u0tkru".to_string(),
            record: ActionRecord::new(ActionType::MergeGroup).with_into("g|FRststbi__@u0tkxd"),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({ "g|FRstrasbou@u0tkru": { "type": "mergeGroup", "into": "g|FRststbi__@u0tkxd" } })
        );

        let parsed: ActionHistoryEntry = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_history_entry_rejects_several_subjects() {
        let value = json!({
            "a": { "type": "deleteGroup" },
            "b": { "type": "deleteGroup" }
        });
        assert!(serde_json::from_value::<ActionHistoryEntry>(value).is_err());
    }

    #[test]
    fn test_update_properties_keep_explicit_null() {
        let props: UpdatePlaceProperties =
            serde_json::from_value(json!({ "name": null, "latitude": 48.5 })).unwrap();
        assert_eq!(props.name, Some(None));
        assert_eq!(props.latitude, Some(Some(48.5)));
        assert_eq!(props.longitude, None);
        assert!(props.moves_place());
    }

    #[test]
    fn test_place_uses_type_tag_and_childs() {
        let value = json!({
            "gpuid": "c|FRstrasbou@u0ts2",
            "type": "cluster",
            "country_code": "fr",
            "name": "Strasbourg, Grand-Est, France",
            "latitude": 48.583,
            "longitude": 7.74815,
            "childs": ["g|FRststbi__@u0tkxd"],
            "serviced": "True"
        });

        let place: Place = serde_json::from_value(value).unwrap();
        assert_eq!(place.kind(), PlaceKind::Cluster);
        assert_eq!(place.serviced(), Some(Serviced::True));
        assert!(place.as_cluster().unwrap().contains("g|FRststbi__@u0tkxd"));
    }
}
