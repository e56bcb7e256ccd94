//! Selection logic invariants

use proptest::prelude::*;
use serde_json::json;

use api_simulator::model::{Content, Operation};
use api_simulator::selector::{
    select_content, select_example, select_response, SimulationQuery,
};

fn operation_with_statuses(statuses: &[u16]) -> Operation {
    let responses: Vec<_> = statuses
        .iter()
        .map(|code| {
            json!({
                "statusCode": code.to_string(),
                "contents": [{
                    "mediaType": "application/json",
                    "examples": [{"name": format!("e{}", code), "value": "{}"}]
                }]
            })
        })
        .collect();

    serde_json::from_value(json!({
        "name": "GET",
        "responses": responses,
    }))
    .unwrap()
}

fn content_with_examples(names: &[String]) -> Content {
    let examples: Vec<_> = names
        .iter()
        .map(|name| json!({"name": name, "value": "{}"}))
        .collect();

    serde_json::from_value(json!({
        "mediaType": "application/json",
        "examples": examples,
    }))
    .unwrap()
}

proptest! {
    /// Without a status override the first declared response always wins
    #[test]
    fn test_first_response_without_override(
        statuses in proptest::collection::vec(100u16..=599, 1..8),
    ) {
        let operation = operation_with_statuses(&statuses);
        let selected = select_response(&operation, &SimulationQuery::default()).unwrap();
        prop_assert_eq!(&selected.status_code, &statuses[0].to_string());
    }

    /// A matching status override selects exactly that response
    #[test]
    fn test_status_override_selects_exact_response(
        statuses in proptest::collection::hash_set(100u16..=599, 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let statuses: Vec<u16> = statuses.into_iter().collect();
        let wanted = statuses[pick.index(statuses.len())];

        let operation = operation_with_statuses(&statuses);
        let query = SimulationQuery::parse(&format!("status={}", wanted));
        let selected = select_response(&operation, &query).unwrap();
        prop_assert_eq!(&selected.status_code, &wanted.to_string());
    }

    /// Random selection always yields a declared example
    #[test]
    fn test_random_example_membership(
        names in proptest::collection::hash_set("[a-z]{1,12}", 1..10),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let content = content_with_examples(&names);
        let query = SimulationQuery::parse("random");

        for _ in 0..10 {
            let selected = select_example(&content, &query).unwrap();
            prop_assert!(names.contains(&selected.name));
        }
    }

    /// An unmatched example name falls back to the first declared example
    #[test]
    fn test_unknown_example_name_falls_back(
        names in proptest::collection::hash_set("[a-z]{1,12}", 1..10),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let content = content_with_examples(&names);

        // "0" can never collide with the lowercase-alpha names
        let query = SimulationQuery::parse("example=0");
        let selected = select_example(&content, &query).unwrap();
        prop_assert_eq!(&selected.name, &names[0]);
    }

    /// An unmatched name never falls through to random selection
    #[test]
    fn test_unmatched_name_ignores_random_flag(
        names in proptest::collection::hash_set("[a-z]{1,12}", 2..10),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let content = content_with_examples(&names);
        let query = SimulationQuery::parse("example=0&random");

        for _ in 0..10 {
            let selected = select_example(&content, &query).unwrap();
            prop_assert_eq!(&selected.name, &names[0]);
        }
    }

    /// Content negotiation never selects a media type outside the declared set
    #[test]
    fn test_negotiated_content_is_declared(
        accept in "[a-z]{1,8}/[a-z*]{1,8}",
    ) {
        let operation = operation_with_statuses(&[200]);
        let response = &operation.responses[0];
        let content = select_content(response, Some(&accept)).unwrap();
        prop_assert_eq!(&content.media_type, "application/json");
    }
}
