use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::{check_ids, parse_mode};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::aggregate_with;
use crate::hydrate::EntityRef;
use crate::models::{EntityId, SquadAggregate};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub player_ids: Vec<EntityId>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// All-round averages for an ad hoc squad. An empty or unprofiled squad
/// yields an insufficient aggregate rather than an error.
pub async fn aggregate_squad(
    State(state): State<AppState>,
    Json(req): Json<AggregateRequest>,
) -> Result<Json<SquadAggregate>, ApiError> {
    check_ids(&req.player_ids)?;
    let mode = parse_mode(req.mode.as_deref())?;

    let refs: Vec<EntityRef> = req.player_ids.into_iter().map(EntityRef::player).collect();
    let players = state.hydrator.hydrate(&refs).await;

    Ok(Json(aggregate_with(
        &players,
        mode,
        &state.config.engine.detector(),
    )))
}
