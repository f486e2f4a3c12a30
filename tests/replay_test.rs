mod common;

use common::*;
use groundplaces::{
    ActionHistoryEntry, CreatePlaceProperties, GroundPlacesError, UpdatePlaceProperties,
};
use serde_json::json;

#[test]
fn test_replay_reproduces_recorded_session() -> anyhow::Result<()> {
    let mut session = controller();
    session.create_group(
        "BBC-STR",
        STRASBOURG_GROUP,
        CreatePlaceProperties::new("fr", "Strasbourg Gare", 48.5850, 7.7350),
    )?;
    session.update_cluster(
        NANCY,
        UpdatePlaceProperties::default().with_name("Nancy, Lorraine, France"),
    )?;
    session.remove_group_from_cluster(VANDOEUVRE_GROUP, NANCY)?;
    session.delete_cluster(NANCY)?;
    session.move_group(KOENIGSHOFFEN_GROUP, STRASBOURG, SCHILTIGHEIM)?;
    session.merge_cluster(SCHILTIGHEIM, STRASBOURG)?;
    assert_eq!(session.history().len(), 6);

    // the history goes through its JSON form, as it would between two runs
    let exported = serde_json::to_string(session.history())?;
    let entries: Vec<ActionHistoryEntry> = serde_json::from_str(&exported)?;

    let mut replayed = controller();
    replayed.apply_history(&entries)?;

    assert_eq!(replayed.places(), session.places());
    assert_eq!(replayed.history(), session.history());
    assert_eq!(replayed.to_file()?, session.to_file()?);
    Ok(())
}

#[test]
fn test_failing_entry_aborts_whole_replay() {
    let mut controller = controller();
    let before = controller.storage().snapshot();

    let entries: Vec<ActionHistoryEntry> = serde_json::from_value(json!([
        { KOENIGSHOFFEN_GROUP: { "type": "moveGroup", "from": STRASBOURG, "into": SCHILTIGHEIM } },
        { VANDOEUVRE_GROUP: { "type": "removeGroupFromCluster", "from": NANCY } },
        { BISCHHEIM_GROUP: { "type": "addGroupToCluster", "into": NANCY_ALL_STOPS } }
    ]))
    .unwrap();

    let err = controller.apply_history(&entries).unwrap_err();

    match &err {
        GroundPlacesError::HistoryReplay { index, message } => {
            assert_eq!(*index, 2);
            assert!(message.contains("115.82km"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err
        .to_string()
        .starts_with("There is an error inside your GroundPlacesActionHistory file."));
    assert_eq!(controller.storage().snapshot(), before);
    assert!(controller.history().is_empty());
}

#[test]
fn test_replay_entry_with_missing_params() {
    let mut controller = controller();

    let entries: Vec<ActionHistoryEntry> = serde_json::from_value(json!([
        { KOENIGSHOFFEN_GROUP: { "type": "createCluster" } }
    ]))
    .unwrap();

    let err = controller.apply_history(&entries).unwrap_err();
    assert!(err.to_string().contains("\"params\""));
}

#[test]
fn test_replay_create_with_incomplete_params() {
    let mut controller = controller();

    let entries: Vec<ActionHistoryEntry> = serde_json::from_value(json!([
        { KOENIGSHOFFEN_GROUP: {
            "type": "createCluster",
            "params": { "countryCode": "fr", "name": "Koenigshoffen, Grand-Est, France", "latitude": 48.5797 }
        } }
    ]))
    .unwrap();

    let err = controller.apply_history(&entries).unwrap_err();
    assert_eq!(
        err.to_string(),
        "There is an error inside your GroundPlacesActionHistory file. More details: \"Error while \
         creating a new StopCluster, please check that you have provide all properties needed \
         (fromStopGroupGpuid, countryCode, latitude, longitude and name).\""
    );
    assert_eq!(controller.places().len(), fixture().len());
}
