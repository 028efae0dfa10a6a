//! Category recommendation based on a user's balance.
//!
//! Gemini is asked first when configured; any failure there falls back to a
//! fixed table of point ranges. Nothing here mutates state.

use std::time::Duration;

use api_types::recommendation::{Recommendation, RecommendationRequest};
use axum::{Json, extract::State};
use engine::{Category, Pagination};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::{ServerError, products::summary_view, server::ServerState, validation::parse_uuid};

pub const PROVIDER_GEMINI: &str = "gemini";
pub const PROVIDER_FALLBACK: &str = "fallback_rules";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const MAX_RECOMMENDED_PRODUCTS: u64 = 20;

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL, `https://generativelanguage.googleapis.com` when `None`.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

#[derive(Error, Debug)]
enum ProviderError {
    #[error("provider not configured")]
    NotConfigured,
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider answered {0}")]
    Status(u16),
    #[error("unusable answer: {0}")]
    Parse(String),
}

/// Category and point range suggested for a balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub category_id: Uuid,
    pub min_points: i64,
    pub max_points: i64,
    pub reasoning: String,
    pub provider: &'static str,
}

#[derive(Debug, Serialize)]
struct CategoryPrompt<'a> {
    id: Uuid,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ModelAnswer {
    recommended_category_id: String,
    min_points_llm: i64,
    max_points_llm: i64,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Clone)]
pub struct Recommender {
    gemini: Option<GeminiConfig>,
    http: reqwest::Client,
}

impl Recommender {
    pub fn new(gemini: Option<GeminiConfig>) -> Self {
        Self {
            gemini,
            http: reqwest::Client::new(),
        }
    }

    /// Rules only; used when no provider is configured.
    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    /// `categories` must not be empty.
    pub async fn recommend(&self, point_balance: i64, categories: &[Category]) -> Option<Plan> {
        match self.ask_gemini(point_balance, categories).await {
            Ok(plan) => Some(plan),
            Err(ProviderError::NotConfigured) => fallback_plan(point_balance, categories),
            Err(err) => {
                tracing::warn!(%err, "recommendation provider failed, using fallback rules");
                fallback_plan(point_balance, categories)
            }
        }
    }

    async fn ask_gemini(
        &self,
        point_balance: i64,
        categories: &[Category],
    ) -> Result<Plan, ProviderError> {
        let config = self.gemini.as_ref().ok_or(ProviderError::NotConfigured)?;
        let base = config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(base)
            .and_then(|url| {
                url.join(&format!("v1beta/models/{}:generateContent", config.model))
            })
            .map_err(|err| ProviderError::Parse(format!("invalid endpoint: {err}")))?;

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt(point_balance, categories) }] }]
        });
        let res = self
            .http
            .post(endpoint)
            .query(&[("key", config.api_key.as_str())])
            .timeout(config.timeout)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(ProviderError::Status(res.status().as_u16()));
        }
        let answer = res.json::<GeminiResponse>().await?;
        let text = answer
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or_else(|| ProviderError::Parse("empty answer".to_string()))?;

        parse_answer(text, categories)
    }
}

fn prompt(point_balance: i64, categories: &[Category]) -> String {
    let listed: Vec<CategoryPrompt<'_>> = categories
        .iter()
        .map(|category| CategoryPrompt {
            id: category.id,
            name: &category.name,
        })
        .collect();
    let listed = serde_json::to_string(&listed).unwrap_or_default();
    format!(
        "Given a user with a current point balance of {point_balance} and the following \
         available categories (each with an id and name): {listed}, suggest the most suitable \
         category by its id and a corresponding minimum and maximum point range for products \
         within that category. Respond only with a JSON object of the form \
         {{\"recommended_category_id\": \"string\", \"min_points_llm\": integer, \
         \"max_points_llm\": integer, \"reasoning\": \"string\"}}."
    )
}

/// Models like to wrap JSON in markdown fences.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_answer(text: &str, categories: &[Category]) -> Result<Plan, ProviderError> {
    let answer: ModelAnswer = serde_json::from_str(strip_fences(text))
        .map_err(|err| ProviderError::Parse(err.to_string()))?;
    let category_id = Uuid::parse_str(answer.recommended_category_id.trim())
        .map_err(|_| ProviderError::Parse("category id is not a UUID".to_string()))?;
    if !categories.iter().any(|category| category.id == category_id) {
        return Err(ProviderError::Parse("unknown category id".to_string()));
    }
    if answer.min_points_llm < 0 || answer.min_points_llm > answer.max_points_llm {
        return Err(ProviderError::Parse("invalid point range".to_string()));
    }
    Ok(Plan {
        category_id,
        min_points: answer.min_points_llm,
        max_points: answer.max_points_llm,
        reasoning: answer.reasoning,
        provider: PROVIDER_GEMINI,
    })
}

/// Point range and advice for a balance.
pub fn fallback_range(point_balance: i64) -> (i64, i64, &'static str) {
    match point_balance {
        b if b >= 1000 => (
            500,
            1500,
            "You have enough points for premium products.",
        ),
        b if b >= 500 => (200, 600, "You can redeem mid-range products."),
        b if b >= 100 => (
            50,
            150,
            "You can redeem small items or save up for bigger rewards.",
        ),
        _ => (
            0,
            100,
            "Keep earning points by purchasing credit packages.",
        ),
    }
}

fn fallback_plan(point_balance: i64, categories: &[Category]) -> Option<Plan> {
    let category = categories.first()?;
    let (min_points, max_points, reasoning) = fallback_range(point_balance);
    Some(Plan {
        category_id: category.id,
        min_points,
        max_points,
        reasoning: reasoning.to_string(),
        provider: PROVIDER_FALLBACK,
    })
}

pub async fn recommend(
    State(state): State<ServerState>,
    Json(payload): Json<RecommendationRequest>,
) -> Result<Json<Recommendation>, ServerError> {
    let user_id = parse_uuid(&payload.user_id, "user_id")?;
    let user = state.engine.user(user_id).await?;
    let categories = state.engine.categories().await?;

    let plan = state
        .recommender
        .recommend(user.point_balance, &categories)
        .await
        .ok_or(ServerError::NoCategories)?;
    let category = categories
        .iter()
        .find(|category| category.id == plan.category_id)
        .ok_or(ServerError::NoCategories)?;
    let products = state
        .engine
        .products_by_category(
            plan.category_id,
            Pagination::new(1, MAX_RECOMMENDED_PRODUCTS)?,
        )
        .await?;

    tracing::info!(
        user_id = %user_id,
        category_id = %plan.category_id,
        provider = plan.provider,
        products = products.len(),
        "recommendation served"
    );
    Ok(Json(Recommendation {
        user_id,
        point_balance: user.point_balance,
        category_id: plan.category_id,
        category_name: category.name.clone(),
        min_points: plan.min_points,
        max_points: plan.max_points,
        reasoning: plan.reasoning,
        provider: plan.provider.to_string(),
        products: products
            .into_iter()
            .map(|product| summary_view(product.summary()))
            .collect(),
    }))
}
