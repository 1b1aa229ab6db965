#![allow(dead_code)]
use roulement::RosterConfig;
use serde_json::{json, Value};

/// 5 membres, postes D et N tous les jours, une semaine.
pub fn small_ward() -> Value {
    json!({
        "num_days": 7,
        "partial_days": 2,
        "shifts": [
            { "id": "D", "days": "every_day" },
            { "id": "N", "days": "every_day" }
        ],
        "staff": [
            { "id": "S1", "roles": ["R"] },
            { "id": "S2", "roles": ["R"] },
            { "id": "S3", "roles": ["R"] },
            { "id": "S4", "roles": ["R"] },
            { "id": "S5", "roles": ["R"] }
        ],
        "skill_mix": {
            "D": [ { "R": 1 } ],
            "N": [ { "R": 1 } ]
        },
        "patterns": [
            ["D", "X"],
            ["N", "X", "X"],
            ["X"]
        ],
        "history": {
            "S1": ["D", "X", "D", "X", "D", "X", "D"],
            "S2": ["X", "D", "X", "D", "X", "D", "X"],
            "S3": ["N", "X", "X", "N", "X", "X", "N"],
            "S4": ["X", "N", "X", "X", "N", "X", "X"],
            "S5": ["X", "X", "N", "X", "X", "N", "X"]
        },
        "undesirable_shifts": ["N"]
    })
}

pub fn config(value: Value) -> RosterConfig {
    serde_json::from_value(value).unwrap()
}

pub fn labels(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
