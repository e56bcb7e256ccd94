//! End-to-end simulation engine tests

use super::common::*;
use reqwest::Method;

#[tokio::test]
async fn test_ping_returns_configured_example() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.get("/api/v0.1/ping").await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(response.text().await.unwrap(), "{\"message\":\"Hello World!\"}");
}

#[tokio::test]
async fn test_path_lookup_is_case_insensitive() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.get("/API/V0.1/PING").await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_unconfigured_path_is_404() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.get("/not/configured").await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_undeclared_method_is_405() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.request(Method::DELETE, "/api/v0.1/ping").await;
    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn test_status_query_override() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.get("/api/v0.1/ping?status=500").await;
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.text().await.unwrap(), "{\"error\":\"boom\"}");
}

#[tokio::test]
async fn test_unmatched_status_override_falls_back_to_first() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.get("/api/v0.1/ping?status=418").await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_example_selection_by_name() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.get("/api/v0.1/ping?example=reply-2").await;
    assert_eq!(response.text().await.unwrap(), "{\"message\":\"Hello again!\"}");

    // Case-insensitive name match
    let response = server.get("/api/v0.1/ping?example=REPLY-2").await;
    assert_eq!(response.text().await.unwrap(), "{\"message\":\"Hello again!\"}");
}

#[tokio::test]
async fn test_random_example_stays_in_declared_list() {
    let server = TestServer::spawn_json(ping_config()).await;

    for _ in 0..20 {
        let body = server
            .get("/api/v0.1/ping?random")
            .await
            .text()
            .await
            .unwrap();
        assert!(
            body == "{\"message\":\"Hello World!\"}" || body == "{\"message\":\"Hello again!\"}",
            "unexpected body {}",
            body
        );
    }
}

#[tokio::test]
async fn test_content_negotiation() {
    let config = r#"{
        "paths": [{
            "uri": "/negotiate",
            "operations": [{
                "name": "get",
                "responses": [{
                    "statusCode": "200",
                    "contents": [
                        {
                            "mediaType": "application/json",
                            "examples": [{"name": "j", "value": "{\"kind\":\"json\"}"}]
                        },
                        {
                            "mediaType": "application/xml",
                            "examples": [{"name": "x", "value": "<kind>xml</kind>"}]
                        }
                    ]
                }]
            }]
        }]
    }"#;
    let server = TestServer::spawn_json(config).await;

    let response = server.get_accept("/negotiate", "application/xml").await;
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/xml"
    );

    // Quality ordering prefers the xml entry here
    let response = server
        .get_accept("/negotiate", "application/json;q=0.4, application/xml;q=0.9")
        .await;
    assert_eq!(response.text().await.unwrap(), "<kind>xml</kind>");

    // Unmatched Accept falls back to the first declared content
    let response = server.get_accept("/negotiate", "image/png").await;
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_delay_range_applies() {
    let config = r#"{
        "paths": [{
            "uri": "/slow",
            "operations": [{
                "name": "get",
                "minDelay": 100,
                "maxDelay": 100,
                "responses": [{
                    "statusCode": "200",
                    "contents": [{
                        "mediaType": "text/plain",
                        "examples": [{"name": "a", "value": "ok"}]
                    }]
                }]
            }]
        }]
    }"#;
    let server = TestServer::spawn_json(config).await;

    let started = std::time::Instant::now();
    let response = server.get("/slow").await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(started.elapsed().as_millis() >= 100);
}

#[tokio::test]
async fn test_post_operation_simulated() {
    let config = r#"{
        "paths": [{
            "uri": "/resource",
            "operations": [
                {
                    "name": "post",
                    "responses": [{
                        "statusCode": "201",
                        "contents": [{
                            "mediaType": "application/json",
                            "examples": [{"name": "created", "value": "{\"id\":1}"}]
                        }]
                    }]
                },
                {
                    "name": "get",
                    "responses": [{
                        "statusCode": "200",
                        "contents": [{
                            "mediaType": "application/json",
                            "examples": [{"name": "listed", "value": "[]"}]
                        }]
                    }]
                }
            ]
        }]
    }"#;
    let server = TestServer::spawn_json(config).await;

    let response = server.request(Method::POST, "/resource").await;
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(response.text().await.unwrap(), "{\"id\":1}");

    let response = server.get("/resource").await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_admin_config_summary() {
    let server = TestServer::spawn_json(ping_config()).await;

    let response = server.get("/__simulator/config").await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["path_count"], 1);
    assert_eq!(body["paths"][0]["uri"], "/api/v0.1/ping");
}
