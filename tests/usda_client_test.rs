// ABOUTME: HTTP-level tests for the FoodData Central client against a wiremock server
// ABOUTME: Verifies record mapping, status classification, malformed bodies, and credential probing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nutrition_grounding::config::UsdaApiConfig;
use nutrition_grounding::errors::{ErrorCode, LookupError};
use nutrition_grounding::external::{FoodDataSource, UsdaClient};
use nutrition_grounding::models::{NutrientBasis, SourceTier};

fn client_for(server: &MockServer) -> UsdaClient {
    let config = UsdaApiConfig {
        base_url: server.uri(),
        ..UsdaApiConfig::with_api_key("test-key")
    };
    UsdaClient::new(config).unwrap()
}

fn search_body() -> serde_json::Value {
    json!({
        "totalHits": 2,
        "foods": [
            {
                "fdcId": 2_341_400,
                "description": "Chicken breast, grilled",
                "dataType": "Survey (FNDDS)",
                "foodNutrients": [
                    {"nutrientId": 1003, "unitName": "G", "value": 30.5},
                    {"nutrientId": 1004, "unitName": "G", "value": 3.2},
                    {"nutrientId": 1005, "unitName": "G", "value": 0.0},
                    {"nutrientId": 1008, "unitName": "KCAL", "value": 151.0}
                ]
            },
            {
                "fdcId": 1_900_001,
                "description": "GRILLED CHICKEN STRIPS",
                "dataType": "Branded",
                "brandOwner": "Acme Foods",
                "servingSize": 84.0,
                "servingSizeUnit": "g",
                "labelNutrients": {
                    "calories": {"value": 110.0},
                    "protein": {"value": 20.0},
                    "carbohydrates": {"value": 1.0},
                    "fat": {"value": 2.5}
                }
            }
        ]
    })
}

#[tokio::test]
async fn test_search_maps_records() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foods/search"))
        .and(query_param("query", "chicken breast grilled"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let records = client_for(&server).search("chicken breast grilled").await?;

    assert_eq!(records.len(), 2);
    let survey = &records[0];
    assert_eq!(survey.record_id, "2341400");
    assert_eq!(survey.source_tier, SourceTier::CuratedRecipe);
    assert_eq!(survey.basis, NutrientBasis::Per100g);
    assert_eq!(survey.nutrients.calories, Some(151.0));

    let branded = &records[1];
    assert_eq!(branded.source_tier, SourceTier::Branded);
    assert_eq!(branded.brand.as_deref(), Some("Acme Foods"));
    assert_eq!(branded.basis, NutrientBasis::PerServing { grams: 84.0 });
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let error = client_for(&server).search("rice").await.unwrap_err();

    assert_eq!(
        error,
        LookupError::RateLimited {
            retry_after: Some(Duration::from_secs(7))
        }
    );
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let error = client_for(&server).search("rice").await.unwrap_err();

    assert!(matches!(error, LookupError::Transient(_)));
}

#[tokio::test]
async fn test_client_error_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid query"))
        .mount(&server)
        .await;

    let error = client_for(&server).search("rice").await.unwrap_err();

    assert_eq!(
        error,
        LookupError::Remote {
            status: Some(400),
            reason: "invalid query".to_owned()
        }
    );
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn test_malformed_body_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"foods\": [oops"))
        .mount(&server)
        .await;

    let error = client_for(&server).search("rice").await.unwrap_err();

    assert!(matches!(error, LookupError::Remote { status: None, .. }));
}

#[tokio::test]
async fn test_empty_result_is_not_an_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foods": []})))
        .mount(&server)
        .await;

    assert!(client_for(&server).search("zorblax").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_verify_credentials_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API_KEY_INVALID"))
        .mount(&server)
        .await;

    let error = client_for(&server).verify_credentials().await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ConfigInvalid);
}

#[tokio::test]
async fn test_verify_credentials_names_service_on_remote_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let error = client_for(&server).verify_credentials().await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceError);
    assert!(error.message.starts_with("USDA FoodData Central: credential check failed"));
}

#[tokio::test]
async fn test_verify_credentials_accepts_working_key() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(path("/foods/search"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foods": []})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).verify_credentials().await?;
    Ok(())
}

#[test]
fn test_client_requires_key() {
    let error = UsdaClient::new(UsdaApiConfig::default()).err().unwrap();
    assert_eq!(error.code, ErrorCode::ConfigMissing);
}
