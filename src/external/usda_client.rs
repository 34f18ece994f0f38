// ABOUTME: USDA FoodData Central search client implementing the food data source seam
// ABOUTME: Maps HTTP failures onto the lookup error taxonomy and search hits onto food records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! USDA `FoodData` Central API Client
//!
//! One [`FoodDataSource::search`] call is one HTTP request to `/foods/search`.
//! Caching and retries live in the database client wrapping this source.
//!
//! # Status mapping
//! - 429 → `RateLimited` (honours `Retry-After` seconds)
//! - 408 / 5xx / connect errors → `Transient`
//! - request timeout → `Timeout`
//! - other 4xx / undecodable body → `Remote` (not retried)
//!
//! # API Reference
//! USDA `FoodData` Central API: <https://fdc.nal.usda.gov/api-guide.html>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use super::source::FoodDataSource;
use crate::config::UsdaApiConfig;
use crate::constants::energy::KJ_PER_KCAL;
use crate::constants::service_names::USDA_FOODDATA_CENTRAL;
use crate::constants::usda::{
    NUTRIENT_CARBS, NUTRIENT_ENERGY, NUTRIENT_ENERGY_ATWATER_GENERAL,
    NUTRIENT_ENERGY_ATWATER_SPECIFIC, NUTRIENT_FAT, NUTRIENT_PROTEIN,
};
use crate::errors::{AppError, AppResult, LookupError};
use crate::models::{FoodRecord, NutrientBasis, NutrientPanel, SourceTier};

/// Longest response body quoted in a `Remote` error
const MAX_ERROR_BODY_CHARS: usize = 200;

/// USDA API search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    fdc_id: u64,
    description: String,
    data_type: Option<String>,
    brand_owner: Option<String>,
    brand_name: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<SearchNutrient>,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
    label_nutrients: Option<LabelNutrients>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNutrient {
    nutrient_id: Option<u32>,
    unit_name: Option<String>,
    // search hits carry `value`, detail payloads carry `amount`
    value: Option<f64>,
    amount: Option<f64>,
}

impl SearchNutrient {
    fn quantity(&self) -> Option<f64> {
        self.value.or(self.amount)
    }

    fn is_kilojoules(&self) -> bool {
        self.unit_name
            .as_deref()
            .is_some_and(|unit| unit.eq_ignore_ascii_case("kj"))
    }
}

/// Per-serving label panel of branded foods
#[derive(Debug, Deserialize)]
struct LabelNutrients {
    calories: Option<LabelValue>,
    protein: Option<LabelValue>,
    carbohydrates: Option<LabelValue>,
    fat: Option<LabelValue>,
}

#[derive(Debug, Deserialize)]
struct LabelValue {
    value: Option<f64>,
}

impl LabelNutrients {
    fn panel(&self) -> NutrientPanel {
        let read = |v: &Option<LabelValue>| v.as_ref().and_then(|l| l.value);
        NutrientPanel {
            calories: read(&self.calories),
            protein_g: read(&self.protein),
            carbs_g: read(&self.carbohydrates),
            fat_g: read(&self.fat),
        }
    }
}

impl SearchFood {
    fn into_record(self) -> FoodRecord {
        let source_tier = self
            .data_type
            .as_deref()
            .map_or(SourceTier::Branded, SourceTier::from_usda_data_type);

        let per_100g = panel_from_nutrients(&self.food_nutrients);
        let serving_grams = self
            .serving_size
            .filter(|_| self.serving_size_unit.as_deref().is_some_and(is_gram_unit));

        let (basis, nutrients) = match (&self.label_nutrients, serving_grams) {
            (Some(label), Some(grams)) if per_100g.is_empty() => {
                (NutrientBasis::PerServing { grams }, label.panel())
            }
            _ => (NutrientBasis::Per100g, per_100g),
        };

        FoodRecord {
            record_id: self.fdc_id.to_string(),
            source_tier,
            description: self.description,
            brand: self.brand_owner.or(self.brand_name),
            basis,
            nutrients,
        }
    }
}

fn is_gram_unit(unit: &str) -> bool {
    matches!(
        unit.to_ascii_lowercase().as_str(),
        "g" | "grm" | "gram" | "grams"
    )
}

/// Collect the four macro fields from a `foodNutrients` list
///
/// Energy prefers the plain kcal entry, then the Atwater general and specific
/// entries. kJ values are converted to kcal.
fn panel_from_nutrients(nutrients: &[SearchNutrient]) -> NutrientPanel {
    let find = |id: u32| {
        nutrients
            .iter()
            .find(|n| n.nutrient_id == Some(id) && n.quantity().is_some())
    };

    let calories = [
        NUTRIENT_ENERGY,
        NUTRIENT_ENERGY_ATWATER_GENERAL,
        NUTRIENT_ENERGY_ATWATER_SPECIFIC,
    ]
    .into_iter()
    .find_map(find)
    .and_then(|n| {
        n.quantity()
            .map(|q| if n.is_kilojoules() { q / KJ_PER_KCAL } else { q })
    });

    NutrientPanel {
        calories,
        protein_g: find(NUTRIENT_PROTEIN).and_then(SearchNutrient::quantity),
        carbs_g: find(NUTRIENT_CARBS).and_then(SearchNutrient::quantity),
        fat_g: find(NUTRIENT_FAT).and_then(SearchNutrient::quantity),
    }
}

/// USDA `FoodData` Central API client
pub struct UsdaClient {
    config: UsdaApiConfig,
    http_client: Client,
}

impl UsdaClient {
    /// Create a client; refuses to start without a credential
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` when the API key is blank and `ExternalServiceError`
    /// if the HTTP client cannot be built
    pub fn new(config: UsdaApiConfig) -> AppResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::config_missing(
                "USDA API key is required to create the FoodData Central client",
            ));
        }
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                AppError::external_service(
                    USDA_FOODDATA_CENTRAL,
                    format!("failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Search with an explicit page size
    async fn search_page(&self, query: &str, page_size: u32) -> Result<Vec<FoodRecord>, LookupError> {
        let url = format!("{}/foods/search", self.config.base_url.trim_end_matches('/'));
        let mut params: Vec<(&str, String)> = vec![
            ("query", query.to_owned()),
            ("pageSize", page_size.to_string()),
            ("api_key", self.config.api_key.clone()),
        ];
        params.extend(
            self.config
                .data_types
                .iter()
                .map(|data_type| ("dataType", data_type.clone())),
        );

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let response = check_status(response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| LookupError::Transient(e.without_url().to_string()))?;
        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| LookupError::Remote {
                status: None,
                reason: format!("malformed search response: {e}"),
            })?;

        debug!(query = %query, hits = parsed.foods.len(), "USDA search returned");
        Ok(parsed
            .foods
            .into_iter()
            .map(SearchFood::into_record)
            .collect())
    }

    fn send_error(&self, error: reqwest::Error) -> LookupError {
        if error.is_timeout() {
            LookupError::Timeout(self.config.request_timeout())
        } else {
            // without_url keeps the api_key query parameter out of messages
            LookupError::Transient(error.without_url().to_string())
        }
    }

    /// Probe the API with a one-result search
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the key is rejected (401/403),
    /// `ExternalServiceError` for any other permanent failure, otherwise the
    /// mapped lookup failure
    pub async fn verify_credentials(&self) -> AppResult<()> {
        match self.search_page("apple", 1).await {
            Ok(_) => {
                info!("USDA API credential verified");
                Ok(())
            }
            Err(LookupError::Remote {
                status: Some(status @ (401 | 403)),
                ..
            }) => Err(AppError::config_invalid(format!(
                "USDA API key was rejected (HTTP {status})"
            ))),
            Err(e @ LookupError::Remote { .. }) => Err(AppError::external_service(
                USDA_FOODDATA_CENTRAL,
                format!("credential check failed: {e}"),
            )
            .with_source(e)),
            Err(e) => Err(AppError::from(e)),
        }
    }
}

async fn check_status(response: Response) -> Result<Response, LookupError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(LookupError::RateLimited { retry_after });
    }
    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        return Err(LookupError::Transient(format!("HTTP {status}")));
    }

    let body = response.text().await.unwrap_or_default();
    let reason: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    Err(LookupError::Remote {
        status: Some(status.as_u16()),
        reason: if reason.is_empty() {
            status.to_string()
        } else {
            reason
        },
    })
}

#[async_trait]
impl FoodDataSource for UsdaClient {
    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>, LookupError> {
        self.search_page(query, self.config.page_size).await
    }

    fn name(&self) -> &'static str {
        USDA_FOODDATA_CENTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn nutrient(id: u32, unit: &str, value: f64) -> SearchNutrient {
        SearchNutrient {
            nutrient_id: Some(id),
            unit_name: Some(unit.to_owned()),
            value: Some(value),
            amount: None,
        }
    }

    #[test]
    fn test_new_requires_key() {
        let error = UsdaClient::new(UsdaApiConfig::default()).err().unwrap();
        assert_eq!(error.code, ErrorCode::ConfigMissing);
    }

    #[test]
    fn test_panel_prefers_kcal_energy() {
        let panel = panel_from_nutrients(&[
            nutrient(NUTRIENT_ENERGY_ATWATER_GENERAL, "KCAL", 170.0),
            nutrient(NUTRIENT_ENERGY, "KCAL", 165.0),
            nutrient(NUTRIENT_PROTEIN, "G", 31.0),
        ]);
        assert_eq!(panel.calories, Some(165.0));
        assert_eq!(panel.protein_g, Some(31.0));
        assert_eq!(panel.fat_g, None);
    }

    #[test]
    fn test_panel_converts_kilojoules() {
        let panel = panel_from_nutrients(&[nutrient(NUTRIENT_ENERGY, "kJ", 418.4)]);
        let kcal = panel.calories.unwrap();
        assert!((kcal - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_branded_label_used_when_per_100g_missing() {
        let food: SearchFood = serde_json::from_value(serde_json::json!({
            "fdcId": 2_345_678,
            "description": "Protein bar",
            "dataType": "Branded",
            "brandOwner": "Acme",
            "servingSize": 50.0,
            "servingSizeUnit": "g",
            "labelNutrients": {
                "calories": {"value": 200.0},
                "protein": {"value": 20.0},
                "carbohydrates": {"value": 22.0},
                "fat": {"value": 7.0}
            }
        }))
        .unwrap();

        let record = food.into_record();
        assert_eq!(record.source_tier, SourceTier::Branded);
        assert_eq!(record.basis, NutrientBasis::PerServing { grams: 50.0 });
        assert_eq!(record.nutrients.calories, Some(200.0));
        assert_eq!(record.brand.as_deref(), Some("Acme"));
    }
}
