//! External value resolution tests

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::*;

fn external_config(url: &str) -> String {
    format!(
        r#"{{
            "paths": [{{
                "uri": "/remote",
                "operations": [{{
                    "name": "get",
                    "responses": [{{
                        "statusCode": "200",
                        "contents": [{{
                            "mediaType": "application/json",
                            "examples": [{{"name": "ext", "externalValue": "{}"}}]
                        }}]
                    }}]
                }}]
            }}]
        }}"#,
        url
    )
}

#[tokio::test]
async fn test_external_value_served_via_on_demand_fetch() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"remote\":true}"))
        .expect(1)
        .mount(&remote)
        .await;

    let server = TestServer::spawn_json(&external_config(&format!(
        "{}/payload",
        remote.uri()
    )))
    .await;

    let response = server.get("/remote").await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "{\"remote\":true}");

    // The materialized value is reused; expect(1) verifies a single fetch
    let response = server.get("/remote").await;
    assert_eq!(response.text().await.unwrap(), "{\"remote\":true}");
}

#[tokio::test]
async fn test_unreachable_external_value_serves_empty_body() {
    // Port 9 (discard) refuses connections
    let server = TestServer::spawn_json(&external_config("http://127.0.0.1:9/nope")).await;

    let response = server.get("/remote").await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "");
}

#[tokio::test]
async fn test_external_value_failure_does_not_affect_other_paths() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/good"))
        .respond_with(ResponseTemplate::new(200).set_body_string("good"))
        .mount(&remote)
        .await;

    let config = format!(
        r#"{{
            "paths": [
                {{
                    "uri": "/bad",
                    "operations": [{{
                        "name": "get",
                        "responses": [{{
                            "statusCode": "200",
                            "contents": [{{
                                "mediaType": "text/plain",
                                "examples": [{{"name": "b", "externalValue": "http://127.0.0.1:9/bad"}}]
                            }}]
                        }}]
                    }}]
                }},
                {{
                    "uri": "/good",
                    "operations": [{{
                        "name": "get",
                        "responses": [{{
                            "statusCode": "200",
                            "contents": [{{
                                "mediaType": "text/plain",
                                "examples": [{{"name": "g", "externalValue": "{}/good"}}]
                            }}]
                        }}]
                    }}]
                }}
            ]
        }}"#,
        remote.uri()
    );
    let server = TestServer::spawn_json(&config).await;

    let response = server.get("/bad").await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().is_empty());

    let response = server.get("/good").await;
    assert_eq!(response.text().await.unwrap(), "good");
}
