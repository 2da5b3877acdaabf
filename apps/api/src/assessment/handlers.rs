use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assessment::profile::{compute_profile, AnswerValue, TraitProfile};
use crate::careers::match_careers;
use crate::errors::AppError;
use crate::recommendation::{recommend, Recommendations};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ScoreRequest {
    pub answers: HashMap<u32, AnswerValue>,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub profile: TraitProfile,
    pub careers: Vec<String>,
}

/// POST /api/v1/assessment/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let profile = compute_profile(&req.answers);
    let careers = match_careers(&state.catalog, &profile.top3);
    Ok(Json(ScoreResponse { profile, careers }))
}

#[derive(Serialize)]
pub struct RecommendationResponse {
    #[serde(flatten)]
    pub profile: TraitProfile,
    pub candidates: Vec<String>,
    #[serde(flatten)]
    pub recommendations: Recommendations,
}

/// POST /api/v1/assessment/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<RecommendationResponse>, AppError> {
    let profile = compute_profile(&req.answers);
    let candidates = match_careers(&state.catalog, &profile.top3);
    let recommendations = recommend(&state.llm, &profile, &candidates).await?;
    Ok(Json(RecommendationResponse {
        profile,
        candidates,
        recommendations,
    }))
}
