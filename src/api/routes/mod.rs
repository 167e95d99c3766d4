pub mod compare;
pub mod meta;
pub mod squads;

use crate::api::ApiError;
use crate::models::{EntityId, PercentileMode};

/// Reject entity sets the comparison views cannot show.
pub(crate) fn check_entity_count(count: usize, max: usize, what: &str) -> Result<(), ApiError> {
    if count < 2 {
        return Err(ApiError::BadRequest(format!(
            "at least 2 {} are required, got {}",
            what, count
        )));
    }
    if count > max {
        return Err(ApiError::BadRequest(format!(
            "at most {} {} can be compared, got {}",
            max, what, count
        )));
    }
    Ok(())
}

pub(crate) fn check_ids<'a>(ids: impl IntoIterator<Item = &'a EntityId>) -> Result<(), ApiError> {
    if ids.into_iter().any(EntityId::is_empty) {
        return Err(ApiError::BadRequest("entity ids must not be empty".to_string()));
    }
    Ok(())
}

/// Mode given as free text in requests; "league" when omitted.
pub(crate) fn parse_mode(mode: Option<&str>) -> Result<PercentileMode, ApiError> {
    match mode {
        None => Ok(PercentileMode::default()),
        Some(m) => m.parse().map_err(ApiError::BadRequest),
    }
}
