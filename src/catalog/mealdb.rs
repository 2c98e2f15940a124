//! TheMealDB v1 JSON API as a [`Catalog`].
//!
//! Endpoints: `categories.php` (partitions), `filter.php?c={category}`
//! (full category membership, no paging), `lookup.php?i={id}` (one meal).

use super::types::{DetailRecord, Ingredient, Partition, Summary};
use super::{Catalog, CatalogError};
use crate::config::CatalogConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// TheMealDB exposes ingredients as strIngredient1..20 / strMeasure1..20.
const MAX_INGREDIENTS: usize = 20;

// ── TheMealDB JSON response types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    categories: Option<Vec<MealDbCategory>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealDbCategory {
    str_category: String,
    #[serde(default)]
    str_category_thumb: Option<String>,
    #[serde(default)]
    str_category_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilterResponse {
    #[serde(default)]
    meals: Option<Vec<MealDbSummary>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealDbSummary {
    id_meal: String,
}

/// Meal objects are flat with numbered ingredient keys, so they stay untyped.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    meals: Option<Vec<Map<String, Value>>>,
}

// ── Parsing ───────────────────────────────────────────────────────────

/// Parse `categories.php`, keeping at most `limit` categories.
pub fn parse_categories(json: &str, limit: Option<usize>) -> Result<Vec<Partition>, CatalogError> {
    let resp: CategoriesResponse = serde_json::from_str(json)?;
    let categories = resp.categories.unwrap_or_default();
    let take = limit.unwrap_or(categories.len());
    Ok(categories
        .into_iter()
        .filter(|c| !c.str_category.trim().is_empty())
        .take(take)
        .map(|c| Partition {
            id: c.str_category.clone(),
            label: c.str_category,
            thumbnail: c.str_category_thumb.unwrap_or_default(),
            description: c.str_category_description.unwrap_or_default(),
        })
        .collect())
}

/// Parse `filter.php`. `"meals": null` is an empty category, not an error.
pub fn parse_filter(json: &str, partition_id: &str) -> Result<Vec<Summary>, CatalogError> {
    let resp: FilterResponse = serde_json::from_str(json)?;
    Ok(resp
        .meals
        .unwrap_or_default()
        .into_iter()
        .map(|m| Summary::new(m.id_meal, partition_id))
        .collect())
}

/// Parse `lookup.php`. A null or empty `meals` array means the id is gone.
pub fn parse_lookup(json: &str, item_id: &str) -> Result<DetailRecord, CatalogError> {
    let resp: LookupResponse = serde_json::from_str(json)?;
    let meal = resp
        .meals
        .and_then(|meals| meals.into_iter().next())
        .ok_or_else(|| CatalogError::NotFound(item_id.to_string()))?;
    Ok(detail_from_meal(&meal, item_id))
}

/// String value of `key`, or empty when absent, null, or not a scalar.
fn field(meal: &Map<String, Value>, key: &str) -> String {
    match meal.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_ingredients(meal: &Map<String, Value>) -> Vec<Ingredient> {
    (1..=MAX_INGREDIENTS)
        .filter_map(|i| {
            let name = field(meal, &format!("strIngredient{}", i));
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Ingredient {
                name: name.to_string(),
                measure: field(meal, &format!("strMeasure{}", i)).trim().to_string(),
            })
        })
        .collect()
}

fn detail_from_meal(meal: &Map<String, Value>, requested_id: &str) -> DetailRecord {
    let item_id = match field(meal, "idMeal") {
        id if id.is_empty() => requested_id.to_string(),
        id => id,
    };
    DetailRecord {
        item_id,
        title: field(meal, "strMeal"),
        category: field(meal, "strCategory"),
        area: field(meal, "strArea"),
        instructions: field(meal, "strInstructions"),
        thumbnail: field(meal, "strMealThumb"),
        tags: parse_tags(&field(meal, "strTags")),
        youtube: field(meal, "strYoutube"),
        source: field(meal, "strSource"),
        ingredients: parse_ingredients(meal),
        partition_id: String::new(),
        sequence_index: 0,
    }
}

// ── Client ────────────────────────────────────────────────────────────

pub struct MealDbClient {
    client: Client,
    base_url: String,
    partition_limit: Option<usize>,
}

impl MealDbClient {
    pub fn new(config: &CatalogConfig, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            base_url: format!("{}/{}", config.api_base.trim_end_matches('/'), api_key),
            partition_limit: config.partition_limit,
        }
    }

    async fn get_text(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, CatalogError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self.client.get(&url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::UpstreamUnavailable(format!(
                "GET {} failed ({}): {}",
                endpoint, status, body
            )));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl Catalog for MealDbClient {
    async fn list_partitions(&self) -> Result<Vec<Partition>, CatalogError> {
        let body = self.get_text("categories.php", &[]).await?;
        let partitions = parse_categories(&body, self.partition_limit)?;
        tracing::debug!(count = partitions.len(), "listed categories");
        Ok(partitions)
    }

    async fn list_summaries(&self, partition_id: &str) -> Result<Vec<Summary>, CatalogError> {
        let body = self.get_text("filter.php", &[("c", partition_id)]).await?;
        let summaries = parse_filter(&body, partition_id)?;
        tracing::debug!(partition = %partition_id, count = summaries.len(), "listed category");
        Ok(summaries)
    }

    async fn fetch_detail(&self, item_id: &str) -> Result<DetailRecord, CatalogError> {
        let body = self.get_text("lookup.php", &[("i", item_id)]).await?;
        parse_lookup(&body, item_id)
    }
}
