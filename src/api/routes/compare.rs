use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::{check_entity_count, check_ids, parse_mode};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{compare_squads, ComparisonSet};
use crate::hydrate::EntityRef;
use crate::models::{ComparisonReport, EntityId, PositionGroup};

#[derive(Debug, Deserialize)]
pub struct PlayerParam {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ComparePlayersRequest {
    pub players: Vec<PlayerParam>,
    #[serde(default)]
    pub mode: Option<String>,

    /// Position group code or label overriding the first player's template
    #[serde(default)]
    pub template: Option<String>,
}

pub async fn compare_players(
    State(state): State<AppState>,
    Json(req): Json<ComparePlayersRequest>,
) -> Result<Json<ComparisonReport>, ApiError> {
    check_entity_count(req.players.len(), state.config.engine.max_entities, "players")?;
    check_ids(req.players.iter().map(|p| &p.id))?;
    let mode = parse_mode(req.mode.as_deref())?;
    let template = req
        .template
        .as_deref()
        .map(str::parse::<PositionGroup>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let refs: Vec<EntityRef> = req
        .players
        .into_iter()
        .map(|p| EntityRef::player(p.id).named(p.name))
        .collect();
    let profiles = state.hydrator.hydrate(&refs).await;

    let report = ComparisonSet::new(profiles, mode)
        .with_template_override(template)
        .with_detector(state.config.engine.detector())
        .report();

    info!(
        players = refs.len(),
        mode = %mode,
        template = ?report.template_group,
        "Compared players"
    );
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamParam {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,

    /// Squad to aggregate instead of the team's own payload
    #[serde(default)]
    pub player_ids: Option<Vec<EntityId>>,
}

#[derive(Debug, Deserialize)]
pub struct CompareTeamsRequest {
    pub teams: Vec<TeamParam>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Compare teams either by their own payloads or, when every team lists
/// `playerIds`, by their squads' all-round averages.
pub async fn compare_teams(
    State(state): State<AppState>,
    Json(req): Json<CompareTeamsRequest>,
) -> Result<Json<ComparisonReport>, ApiError> {
    check_entity_count(req.teams.len(), state.config.engine.max_entities, "teams")?;
    check_ids(req.teams.iter().map(|t| &t.id))?;
    let mode = parse_mode(req.mode.as_deref())?;
    let detector = state.config.engine.detector();

    let with_squads = req.teams.iter().filter(|t| t.player_ids.is_some()).count();
    if with_squads != 0 && with_squads != req.teams.len() {
        return Err(ApiError::BadRequest(
            "either every team or no team must list playerIds".to_string(),
        ));
    }

    if with_squads == 0 {
        let refs: Vec<EntityRef> = req
            .teams
            .into_iter()
            .map(|t| EntityRef::team(t.id).named(t.name))
            .collect();
        let profiles = state.hydrator.hydrate(&refs).await;
        let report = ComparisonSet::new(profiles, mode)
            .with_detector(detector)
            .report();
        info!(teams = refs.len(), mode = %mode, "Compared team profiles");
        return Ok(Json(report));
    }

    let mut squads = Vec::with_capacity(req.teams.len());
    for team in req.teams {
        let player_ids = team.player_ids.unwrap_or_default();
        check_ids(&player_ids)?;
        let team_ref = EntityRef::team(team.id).named(team.name);
        squads.push(state.hydrator.hydrate_squad(&team_ref, &player_ids).await);
    }

    let report = compare_squads(&squads, mode, &detector);
    info!(teams = squads.len(), mode = %mode, "Compared squads");
    Ok(Json(report))
}
