use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use sayahat_agents::TripPlannerAgent;
use sayahat_core::{PlaceId, PlannerError, TripPlan, TripRequest, DEFAULT_PROVIDER};
use sayahat_observability::AppMetrics;
use sayahat_storage::{import_seed, CatalogSeed, MemoryStore, Store};

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/almaty_catalog.json")
}

async fn seeded_agent(store: Store) -> TripPlannerAgent<Store> {
    let seed = CatalogSeed::from_json_file(catalog_path()).expect("seed should parse");
    import_seed(&store, seed).await.expect("seed should import");
    TripPlannerAgent::new(Arc::new(store), AppMetrics::shared(), DEFAULT_PROVIDER)
}

fn all_ids(plan: &TripPlan) -> Vec<PlaceId> {
    plan.stop_ids().collect()
}

#[tokio::test]
async fn anonymous_plan_covers_every_requested_day() {
    let agent = seeded_agent(Store::memory()).await;

    let plan = agent
        .plan_trip(None, TripRequest::new("almaty", 3))
        .await
        .expect("plan should build");

    assert_eq!(plan.days_requested, 3);
    assert_eq!(plan.days_generated, 3);
    assert_eq!(plan.pace, "medium");

    let ids = all_ids(&plan);
    assert_eq!(ids.len(), ids.iter().collect::<HashSet<_>>().len());

    // Dostyk Plaza is flagged closed right now
    assert!(!ids.contains(&13));
    assert!(!plan.diagnostics.filter_fallback);

    for day in &plan.itinerary {
        assert!(day.summary.starts_with(&format!("Day {}: ", day.day)));
        if day.far_from_center {
            assert!(day.stops.len() <= 2);
        } else {
            assert!(day.stops.len() <= 4);
        }
    }
    assert_eq!(
        plan.tips,
        vec!["Add interests for more personalized results.".to_string()]
    );
}

#[tokio::test]
async fn stored_preferences_shape_the_plan() {
    let agent = seeded_agent(Store::memory()).await;

    let plan = agent
        .plan_trip(Some("aruzhan"), TripRequest::new("Almaty", 2))
        .await
        .expect("plan should build");

    assert_eq!(plan.budget, Some(1));
    assert_eq!(plan.interests, vec!["history".to_string(), "nature".to_string()]);
    assert_eq!(plan.travel_style.as_deref(), Some("relax"));
    assert_eq!(plan.pace, "slow");
    assert_eq!(plan.diagnostics.stops_per_day, 3);
    assert!(plan.tips.is_empty());

    // everything priced above budget 1 stays out
    let over_budget = [6, 8, 11, 12, 15];
    assert!(all_ids(&plan).iter().all(|id| !over_budget.contains(id)));
}

#[tokio::test]
async fn preferences_are_ignored_when_disabled() {
    let agent = seeded_agent(Store::memory()).await;

    let request = TripRequest {
        use_preferences: false,
        ..TripRequest::new("Almaty", 1)
    };
    let plan = agent
        .plan_trip(Some("aruzhan"), request)
        .await
        .expect("plan should build");

    assert_eq!(plan.budget, None);
    assert!(plan.interests.is_empty());
    assert_eq!(plan.pace, "medium");
}

#[tokio::test]
async fn unknown_user_plans_with_request_fields_only() {
    let agent = seeded_agent(Store::memory()).await;

    let request = TripRequest {
        interests: vec![" Nature ".to_string()],
        pace: Some("fast".to_string()),
        ..TripRequest::new("Almaty", 1)
    };
    let plan = agent
        .plan_trip(Some("ghost"), request)
        .await
        .expect("plan should build");

    assert_eq!(plan.interests, vec!["nature".to_string()]);
    assert_eq!(plan.diagnostics.stops_per_day, 5);
    assert_eq!(plan.budget, None);
}

#[tokio::test]
async fn city_without_places_is_not_found() {
    let agent = seeded_agent(Store::memory()).await;

    let err = agent
        .plan_trip(None, TripRequest::new("Shymkent", 2))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PlannerError>(),
        Some(PlannerError::NoPlacesForCity { .. })
    ));

    let snapshot = agent.metrics().snapshot();
    assert_eq!(snapshot.plans_requested_total, 1);
    assert_eq!(snapshot.plans_built_total, 0);
    assert_eq!(snapshot.no_places_total, 1);
}

#[tokio::test]
async fn sqlite_and_memory_catalogs_plan_identically() {
    let memory = seeded_agent(Store::memory()).await;
    let sqlite = seeded_agent(
        Store::sqlite("sqlite::memory:")
            .await
            .expect("sqlite should open"),
    )
    .await;

    let request = TripRequest {
        interests: vec!["museum".to_string(), "food".to_string()],
        ..TripRequest::new("ALMATY", 3)
    };

    let from_memory = memory.plan_trip(None, request.clone()).await.unwrap();
    let from_sqlite = sqlite.plan_trip(None, request.clone()).await.unwrap();
    let again = sqlite.plan_trip(None, request).await.unwrap();

    assert_eq!(from_memory, from_sqlite);
    assert_eq!(from_sqlite, again);
}

#[tokio::test]
async fn stored_interest_mapping_extends_defaults() {
    let agent = seeded_agent(Store::memory()).await;

    let table = agent.interest_table().await.unwrap();
    assert!(table["nature"].contains(&"ski_resort".to_string()));
    assert!(table["museum"].contains(&"art_gallery".to_string()));

    let request = TripRequest {
        interests: vec!["nature".to_string()],
        use_preferences: false,
        ..TripRequest::new("Almaty", 1)
    };
    let plan = agent.plan_trip(None, request).await.unwrap();
    let shymbulak = plan
        .itinerary
        .iter()
        .flat_map(|day| &day.stops)
        .find(|stop| stop.id == 11)
        .expect("must-visit ski resort should anchor the day");

    // 4.8 rating, capped popularity, interest and must-visit bonuses
    assert!((shymbulak.score - (9.6 + 5.0 + 1.5 + 2.5)).abs() < 1e-9);
}

#[tokio::test]
async fn empty_store_reports_no_places() {
    let agent = TripPlannerAgent::new(
        Arc::new(MemoryStore::new()),
        AppMetrics::shared(),
        DEFAULT_PROVIDER,
    );

    let err = agent
        .plan_trip(None, TripRequest::new("Almaty", 1))
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<PlannerError>(),
        Some(&PlannerError::NoPlacesForCity {
            city: "Almaty".to_string()
        })
    );
}
