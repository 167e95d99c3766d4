//! Profile hydration.
//!
//! Turns entity references into profiles by fetching their payloads through
//! a [`ProfileSource`]. Fetches run with bounded concurrency and results keep
//! the order of the input. A failed or malformed fetch degrades that one
//! entity to a no-data profile.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculate::Squad;
use crate::fetch::ProfileSource;
use crate::models::{EntityId, EntityKind, EntityProfile};

/// Default number of payloads fetched concurrently.
pub const DEFAULT_FETCH_WIDTH: usize = 10;

/// An entity to hydrate, optionally with a caller-supplied display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub kind: EntityKind,
    pub display_name: Option<String>,
}

impl EntityRef {
    pub fn player(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::Player,
            display_name: None,
        }
    }

    pub fn team(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::Team,
            display_name: None,
        }
    }

    pub fn named(mut self, name: Option<String>) -> Self {
        self.display_name = name.filter(|n| !n.trim().is_empty());
        self
    }
}

pub struct Hydrator {
    source: Arc<dyn ProfileSource>,
    width: usize,
}

impl Hydrator {
    pub fn new(source: Arc<dyn ProfileSource>, width: usize) -> Self {
        Self {
            source,
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Fetch a single profile. Never fails.
    pub async fn hydrate_one(&self, entity: &EntityRef) -> EntityProfile {
        match self.source.fetch_payload(entity.kind, &entity.id).await {
            Ok(payload) => EntityProfile::from_payload(
                entity.id.clone(),
                entity.display_name.clone(),
                entity.kind,
                payload,
            ),
            Err(e) => {
                warn!(
                    id = %entity.id,
                    kind = %entity.kind,
                    error = %e,
                    "Profile fetch failed, treating entity as no data"
                );
                let name = entity
                    .display_name
                    .clone()
                    .unwrap_or_else(|| entity.id.to_string());
                EntityProfile::no_data(entity.id.clone(), name, entity.kind)
            }
        }
    }

    /// Fetch all profiles, at most `width` in flight, in input order.
    pub async fn hydrate(&self, entities: &[EntityRef]) -> Vec<EntityProfile> {
        let profiles: Vec<EntityProfile> = stream::iter(entities.iter().cloned())
            .map(|entity| async move { self.hydrate_one(&entity).await })
            .buffered(self.width)
            .collect()
            .await;

        let with_data = profiles.iter().filter(|p| p.has_data()).count();
        info!(
            source = self.source.name(),
            requested = entities.len(),
            with_data,
            "Hydrated profiles"
        );
        profiles
    }

    /// Hydrate every player of a team.
    pub async fn hydrate_squad(
        &self,
        team: &EntityRef,
        player_ids: &[EntityId],
    ) -> Squad {
        let refs: Vec<EntityRef> = player_ids.iter().cloned().map(EntityRef::player).collect();
        let players = self.hydrate(&refs).await;
        Squad {
            id: team.id.clone(),
            name: team
                .display_name
                .clone()
                .unwrap_or_else(|| team.id.to_string()),
            players,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{payload, MockSource};
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_hydrate_preserves_order() {
        let source = MockSource::default()
            .with("1", payload(&[("Passes per 90", 40.0, 60.0)]))
            .with("2", payload(&[("Passes per 90", 50.0, 70.0)]));
        let hydrator = Hydrator::new(Arc::new(source), 10);

        let refs = vec![EntityRef::player("2"), EntityRef::player("1")];
        let profiles = hydrator.hydrate(&refs).await;

        assert_eq!(profiles[0].id.as_str(), "2");
        assert_eq!(profiles[1].id.as_str(), "1");
        assert_eq!(profiles[0].metric("Passes per 90").unwrap().value, 50.0);
    }

    #[tokio::test]
    async fn test_hydrate_runs_on_spawned_task() {
        let source = MockSource::default().with("1", payload(&[("Passes per 90", 40.0, 60.0)]));
        let hydrator = Arc::new(Hydrator::new(Arc::new(source), 10));

        let task = {
            let hydrator = Arc::clone(&hydrator);
            tokio::spawn(async move {
                let refs = vec![EntityRef::player("1"), EntityRef::player("2")];
                hydrator.hydrate(&refs).await
            })
        };
        let profiles = task.await.unwrap();

        assert_eq!(profiles.len(), 2);
        assert!(profiles[0].has_data());
        assert!(!profiles[1].has_data());
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_to_no_data() {
        let source = MockSource::default()
            .with("1", payload(&[("Passes per 90", 40.0, 60.0)]))
            .with("bad", serde_json::json!({"positionGroup": "CB"}));
        let hydrator = Hydrator::new(Arc::new(source), 10);

        let refs = vec![
            EntityRef::player("1"),
            EntityRef::player("missing").named(Some("Ghost".into())),
            EntityRef::player("bad"),
        ];
        let profiles = hydrator.hydrate(&refs).await;

        assert_eq!(profiles.len(), 3);
        assert!(profiles[0].has_data());
        assert!(!profiles[1].has_data());
        assert_eq!(profiles[1].display_name, "Ghost");
        assert!(!profiles[2].has_data());
        assert_eq!(profiles[2].display_name, "bad");
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut source = MockSource {
            delay: Duration::from_millis(20),
            ..MockSource::default()
        };
        for i in 0..25 {
            source = source.with(&i.to_string(), payload(&[("Fouls per 90", 1.0, 40.0)]));
        }
        let source = Arc::new(source);
        let hydrator = Hydrator::new(source.clone(), DEFAULT_FETCH_WIDTH);

        let refs: Vec<EntityRef> = (0..25u64).map(EntityRef::player).collect();
        let profiles = hydrator.hydrate(&refs).await;

        assert_eq!(profiles.len(), 25);
        assert_eq!(source.calls.load(Ordering::SeqCst), 25);
        let peak = source.peak.load(Ordering::SeqCst);
        assert!(peak <= DEFAULT_FETCH_WIDTH, "peak concurrency {}", peak);
        assert!(peak > 1, "fetches never overlapped");
    }

    #[tokio::test]
    async fn test_zero_width_is_clamped() {
        let hydrator = Hydrator::new(Arc::new(MockSource::default()), 0);
        assert_eq!(hydrator.width(), 1);
        assert_eq!(hydrator.source_name(), "mock");
    }

    #[tokio::test]
    async fn test_hydrate_squad() {
        let source = MockSource::default()
            .with("10", payload(&[("Accurate passes, %", 83.0, 70.0)]))
            .with("11", payload(&[("Accurate passes, %", 79.0, 55.0)]));
        let hydrator = Hydrator::new(Arc::new(source), 10);

        let team = EntityRef::team("fcsb").named(Some("FCSB".into()));
        let ids = vec![EntityId::from("10"), EntityId::from("11"), EntityId::from("12")];
        let squad = hydrator.hydrate_squad(&team, &ids).await;

        assert_eq!(squad.name, "FCSB");
        assert_eq!(squad.players.len(), 3);
        assert_eq!(squad.players.iter().filter(|p| p.has_data()).count(), 2);
        assert!(squad.players.iter().all(|p| p.kind == EntityKind::Player));
    }
}
