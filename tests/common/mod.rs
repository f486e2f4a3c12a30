#![allow(dead_code)]

use groundplaces::{GroundPlacesController, GroundPlacesFile};
use serde_json::json;

pub const STRASBOURG: &str = "c|FRstrasbou@u0ts2";
pub const SCHILTIGHEIM: &str = "c|FRschilti@u0tsb";
pub const NANCY_ALL_STOPS: &str = "c|FRnaarto__@u0skg";
pub const NANCY: &str = "c|FRnancy___@u0sku";

pub const STRASBOURG_GROUP: &str = "g|FRstrasbou@u0tkru";
pub const BISCHHEIM_GROUP: &str = "g|FRststbi__@u0tkxd";
pub const KOENIGSHOFFEN_GROUP: &str = "g|FRstkoen__@u0tkq8";
pub const VANDOEUVRE_GROUP: &str = "g|FRnanvanna@u0skgb";

/// Two Strasbourg clusters sharing the Bischheim group, two Nancy clusters
/// sharing the Vandoeuvre group, and an empty Koenigshoffen group.
pub fn fixture() -> GroundPlacesFile {
    let value = json!({
        STRASBOURG: {
            "type": "cluster",
            "unique_name": "strasbourg",
            "country_code": "fr",
            "name": "Strasbourg, Grand-Est, France",
            "latitude": 48.583,
            "longitude": 7.74815,
            "childs": [STRASBOURG_GROUP, BISCHHEIM_GROUP, KOENIGSHOFFEN_GROUP],
            "serviced": "True"
        },
        SCHILTIGHEIM: {
            "type": "cluster",
            "country_code": "fr",
            "name": "Schiltigheim, Grand-Est, France",
            "latitude": 48.6075,
            "longitude": 7.7497,
            "childs": [BISCHHEIM_GROUP],
            "serviced": "False"
        },
        NANCY_ALL_STOPS: {
            "type": "cluster",
            "country_code": "fr",
            "name": "Nancy - Tous les arrêts, Grand Est, France",
            "latitude": 48.6484863111,
            "longitude": 6.1444727044,
            "childs": [VANDOEUVRE_GROUP],
            "serviced": "False"
        },
        NANCY: {
            "type": "cluster",
            "country_code": "fr",
            "name": "Nancy, Grand Est, France",
            "latitude": 48.692054,
            "longitude": 6.184417,
            "childs": [VANDOEUVRE_GROUP]
        },
        STRASBOURG_GROUP: {
            "type": "group",
            "country_code": "fr",
            "name": "Strasbourg",
            "latitude": 48.58392,
            "longitude": 7.73417,
            "childs": [
                {
                    "unique_name": null,
                    "company_name": "flixbus",
                    "name": "Strasbourg",
                    "latitude": 48.574179,
                    "company_id": 5,
                    "longitude": 7.754266,
                    "id": "23"
                },
                {
                    "unique_name": null,
                    "company_name": "blablacar",
                    "name": "Strasbourg Gare",
                    "latitude": 48.5850,
                    "company_id": 9,
                    "longitude": 7.7350,
                    "id": "BBC-STR"
                }
            ],
            "serviced": "True"
        },
        BISCHHEIM_GROUP: {
            "type": "group",
            "country_code": "fr",
            "name": "Strasbourg, Strasbourg - Bischheim",
            "latitude": 48.616228,
            "longitude": 7.719863,
            "childs": [
                {
                    "unique_name": null,
                    "company_name": "flixbus",
                    "name": "Strasbourg - Bischheim",
                    "latitude": 48.616228,
                    "company_id": 5,
                    "longitude": 7.719863,
                    "id": "FLX-BISCH"
                }
            ],
            "serviced": "False"
        },
        KOENIGSHOFFEN_GROUP: {
            "type": "group",
            "country_code": "fr",
            "name": "Strasbourg Koenigshoffen",
            "latitude": 48.5797,
            "longitude": 7.7172,
            "childs": []
        },
        VANDOEUVRE_GROUP: {
            "type": "group",
            "country_code": "fr",
            "name": "Nancy Vandoeuvre",
            "latitude": 48.648395,
            "longitude": 6.144364,
            "childs": [
                {
                    "unique_name": null,
                    "company_name": "flixbus",
                    "name": "Nancy Vandoeuvre",
                    "latitude": 48.648395,
                    "company_id": 5,
                    "longitude": 6.144364,
                    "id": "NCY"
                }
            ]
        }
    });

    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("fixture is not an object: {other}"),
    }
}

pub fn controller() -> GroundPlacesController {
    let mut controller = GroundPlacesController::new();
    controller.init(fixture()).expect("fixture loads");
    controller
}
