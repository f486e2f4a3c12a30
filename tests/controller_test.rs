mod common;

use common::*;
use groundplaces::{
    ActionType, CreatePlaceProperties, GroundPlacesController, GroundPlacesError, Serviced,
    SharedController, UpdatePlaceProperties,
};
use serde_json::json;

#[test]
fn test_add_group_too_far_from_cluster_is_refused() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let err = controller
        .add_group_to_cluster(BISCHHEIM_GROUP, NANCY_ALL_STOPS)
        .unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, GroundPlacesError::DistanceExceeded { .. }));
    assert!(message.contains("115.82km"), "{message}");
    assert!(message.contains("70km"), "{message}");
    assert_eq!(controller.storage().snapshot(), before);
    assert!(controller.history().is_empty());
}

#[test]
fn test_move_stop_into_group_hosting_same_company_is_refused() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let err = controller
        .move_provider_stop("FLX-BISCH", BISCHHEIM_GROUP, STRASBOURG_GROUP)
        .unwrap_err();

    assert!(matches!(err, GroundPlacesError::DuplicateCompany { .. }));
    let source = controller.get_group(BISCHHEIM_GROUP).unwrap();
    assert!(source.stop_position("FLX-BISCH").is_some());
    assert_eq!(controller.storage().snapshot(), before);
}

#[test]
fn test_merge_cluster_detaches_shared_group() {
    let mut controller = controller();

    controller.merge_cluster(SCHILTIGHEIM, STRASBOURG).unwrap();

    let source = controller.get_cluster(SCHILTIGHEIM).unwrap();
    let target = controller.get_cluster(STRASBOURG).unwrap();
    assert!(source.children.is_empty());
    assert_eq!(
        target
            .children
            .iter()
            .filter(|child| child.as_str() == BISCHHEIM_GROUP)
            .count(),
        1
    );
    assert_eq!(controller.history().len(), 1);
}

#[test]
fn test_create_cluster_records_params() -> anyhow::Result<()> {
    let mut controller = controller();
    let params =
        CreatePlaceProperties::new("fr", "Koenigshoffen, Grand-Est, France", 48.5797, 7.7172);

    let cluster = controller.create_cluster(KOENIGSHOFFEN_GROUP, params)?;

    assert_eq!(cluster.children, vec![KOENIGSHOFFEN_GROUP.to_string()]);
    assert!(cluster.gpuid.starts_with("c|FRkoenigsh@"));
    assert_eq!(cluster.has_been_modified, None);
    assert_eq!(controller.get_cluster(&cluster.gpuid)?, cluster);

    let history = serde_json::to_value(controller.history())?;
    assert_eq!(
        history,
        json!([{
            KOENIGSHOFFEN_GROUP: {
                "type": "createCluster",
                "params": {
                    "countryCode": "fr",
                    "name": "Koenigshoffen, Grand-Est, France",
                    "latitude": 48.5797,
                    "longitude": 7.7172
                }
            }
        }])
    );
    Ok(())
}

#[test]
fn test_create_group_takes_stop_and_parents() -> anyhow::Result<()> {
    let mut controller = controller();
    let params = CreatePlaceProperties::new("fr", "Strasbourg Gare", 48.5850, 7.7350);

    let group = controller.create_group("BBC-STR", STRASBOURG_GROUP, params)?;

    assert!(group.gpuid.starts_with("g|FRstga____@"));
    assert_eq!(group.children.len(), 1);
    assert_eq!(group.children[0].id, "BBC-STR");
    assert_eq!(group.serviced, Some(Serviced::False));
    assert!(controller.get_cluster(STRASBOURG)?.contains(&group.gpuid));
    assert!(controller
        .get_group(STRASBOURG_GROUP)?
        .stop_position("BBC-STR")
        .is_none());

    let entry = &controller.history()[0];
    assert_eq!(entry.subject, "BBC-STR");
    assert_eq!(entry.record.from.as_deref(), Some(STRASBOURG_GROUP));
    Ok(())
}

#[test]
fn test_create_group_without_name_changes_nothing() {
    let mut controller = controller();
    let before = controller.storage().snapshot();
    let params = CreatePlaceProperties {
        name: None,
        ..CreatePlaceProperties::new("fr", "", 48.5850, 7.7350)
    };

    let err = controller
        .create_group("BBC-STR", STRASBOURG_GROUP, params)
        .unwrap_err();

    assert!(matches!(err, GroundPlacesError::MissingField { ref field, .. } if field == "name"));
    assert_eq!(controller.storage().snapshot(), before);
}

#[test]
fn test_remove_last_parent_is_refused() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let err = controller
        .remove_group_from_cluster(STRASBOURG_GROUP, STRASBOURG)
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::WouldOrphan { .. }));
    assert_eq!(controller.storage().snapshot(), before);

    // Bischheim keeps Schiltigheim as parent
    controller
        .remove_group_from_cluster(BISCHHEIM_GROUP, STRASBOURG)
        .unwrap();
    assert_eq!(controller.storage().parents_of(BISCHHEIM_GROUP).len(), 1);
}

#[test]
fn test_move_group_between_clusters() {
    let mut controller = controller();

    let err = controller
        .move_group(KOENIGSHOFFEN_GROUP, STRASBOURG, STRASBOURG)
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::NoOpRequest { .. }));

    controller
        .move_group(KOENIGSHOFFEN_GROUP, STRASBOURG, SCHILTIGHEIM)
        .unwrap();
    assert!(!controller.get_cluster(STRASBOURG).unwrap().contains(KOENIGSHOFFEN_GROUP));
    assert!(controller.get_cluster(SCHILTIGHEIM).unwrap().contains(KOENIGSHOFFEN_GROUP));

    let record = &controller.history()[0].record;
    assert_eq!(record.action, ActionType::MoveGroup);
    assert_eq!(record.from.as_deref(), Some(STRASBOURG));
    assert_eq!(record.into.as_deref(), Some(SCHILTIGHEIM));
}

#[test]
fn test_merge_group_moves_every_stop() {
    let mut controller = controller();

    let err = controller
        .merge_group(KOENIGSHOFFEN_GROUP, STRASBOURG_GROUP)
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::NothingToMerge { .. }));

    controller
        .merge_group(STRASBOURG_GROUP, KOENIGSHOFFEN_GROUP)
        .unwrap();
    assert!(controller.get_group(STRASBOURG_GROUP).unwrap().children.is_empty());
    assert_eq!(
        controller.get_group(KOENIGSHOFFEN_GROUP).unwrap().children.len(),
        2
    );
}

#[test]
fn test_update_group_too_far_from_parent_rolls_back() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let err = controller
        .update_group(
            KOENIGSHOFFEN_GROUP,
            UpdatePlaceProperties::default().with_coordinates(48.648395, 6.144364),
        )
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::DistanceExceeded { .. }));
    assert_eq!(controller.storage().snapshot(), before);
}

#[test]
fn test_non_finite_coordinates_are_refused() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let err = controller
        .update_group(
            BISCHHEIM_GROUP,
            UpdatePlaceProperties::default().with_coordinates(f64::NAN, f64::NAN),
        )
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::InvalidConfigValueError { .. }));

    let err = controller
        .create_cluster(
            KOENIGSHOFFEN_GROUP,
            CreatePlaceProperties::new("fr", "Koenigshoffen, Grand-Est, France", f64::NAN, 7.7172),
        )
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::InvalidConfigValueError { .. }));

    assert_eq!(controller.storage().snapshot(), before);
    assert!(controller.history().is_empty());

    // Bischheim kept its coordinates, so Nancy is still out of reach
    let err = controller
        .add_group_to_cluster(BISCHHEIM_GROUP, NANCY_ALL_STOPS)
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::DistanceExceeded { .. }));
}

#[test]
fn test_merge_group_failing_midway_rolls_back() {
    let mut file = fixture();
    file[KOENIGSHOFFEN_GROUP]["childs"] = json!([{
        "unique_name": null,
        "company_name": "blablacar",
        "name": "Strasbourg Koenigshoffen",
        "latitude": 48.5797,
        "company_id": 9,
        "longitude": 7.7172,
        "id": "BBC-KOE"
    }]);
    let mut controller = GroundPlacesController::new();
    controller.init(file).unwrap();
    let before = controller.storage().snapshot();

    // "23" moves first, then "BBC-STR" hits the blablacar stop already there
    let err = controller
        .merge_group(STRASBOURG_GROUP, KOENIGSHOFFEN_GROUP)
        .unwrap_err();

    assert!(matches!(err, GroundPlacesError::DuplicateCompany { .. }));
    assert_eq!(controller.storage().snapshot(), before);
    assert!(controller.history().is_empty());
    assert!(controller
        .get_group(STRASBOURG_GROUP)
        .unwrap()
        .stop_position("23")
        .is_some());
}

#[test]
fn test_merge_cluster_failing_midway_rolls_back() {
    let mut file = fixture();
    file[NANCY_ALL_STOPS]["childs"] = json!([VANDOEUVRE_GROUP, BISCHHEIM_GROUP]);
    let mut controller = GroundPlacesController::new();
    controller.init(file).unwrap();
    let before = controller.storage().snapshot();

    // Vandoeuvre is detached first, then Bischheim is too far from Nancy
    let err = controller.merge_cluster(NANCY_ALL_STOPS, NANCY).unwrap_err();

    assert!(matches!(err, GroundPlacesError::DistanceExceeded { .. }));
    assert_eq!(controller.storage().snapshot(), before);
    assert!(controller.history().is_empty());
    assert!(controller
        .get_cluster(NANCY_ALL_STOPS)
        .unwrap()
        .contains(VANDOEUVRE_GROUP));
}

#[test]
fn test_update_cluster_too_far_from_child_rolls_back() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let err = controller
        .update_cluster(
            SCHILTIGHEIM,
            UpdatePlaceProperties::default().with_coordinates(48.6484863111, 6.1444727044),
        )
        .unwrap_err();

    assert!(matches!(err, GroundPlacesError::DistanceExceeded { .. }));
    assert_eq!(controller.storage().snapshot(), before);
    assert!(controller.history().is_empty());
}

#[test]
fn test_update_cluster_checks_name_format() {
    let mut controller = controller();

    let err = controller
        .update_cluster(NANCY, UpdatePlaceProperties::default().with_name("Nancy"))
        .unwrap_err();
    assert!(matches!(err, GroundPlacesError::InvalidNameFormat { .. }));

    let cluster = controller
        .update_cluster(
            NANCY,
            UpdatePlaceProperties::default()
                .with_name("Nancy, Lorraine, France")
                .with_serviced(Serviced::True),
        )
        .unwrap();
    assert_eq!(cluster.name, "Nancy, Lorraine, France");
    assert_eq!(cluster.serviced, Some(Serviced::True));
    assert_eq!(cluster.has_been_modified, None);
}

#[test]
fn test_delete_only_empty_places() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let err = controller.delete_group(STRASBOURG_GROUP).unwrap_err();
    assert!(matches!(err, GroundPlacesError::HasChildren { .. }));
    assert_eq!(controller.storage().snapshot(), before);

    let err = controller.delete_cluster(STRASBOURG_GROUP).unwrap_err();
    assert!(err.to_string().contains("cannot be found"));

    controller.delete_group(KOENIGSHOFFEN_GROUP).unwrap();
    assert!(!controller.storage().contains(KOENIGSHOFFEN_GROUP));
    assert!(!controller.get_cluster(STRASBOURG).unwrap().contains(KOENIGSHOFFEN_GROUP));
}

#[test]
fn test_unknown_place_is_reported_with_its_kind() {
    let mut controller = controller();

    let err = controller
        .add_group_to_cluster(BISCHHEIM_GROUP, "c|FRnaarto__@u0skgg")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The StopCluster with the Gpuid \"c|FRnaarto__@u0skgg\" is not found."
    );
}

#[test]
fn test_shared_controller_across_threads() {
    let shared = SharedController::new(controller());

    let handles: Vec<_> = [(STRASBOURG, SCHILTIGHEIM), (NANCY, NANCY_ALL_STOPS)]
        .into_iter()
        .map(|(cluster, other)| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                shared.with(|controller| controller.merge_cluster(other, cluster))
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let history_len = shared.with(|controller| Ok(controller.history().len())).unwrap();
    assert_eq!(history_len, 2);
}
