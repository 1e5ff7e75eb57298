use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use sayahat_core::{build_trip_plan, InterestSynonyms, TripPlan, TripRequest};
use sayahat_observability::AppMetrics;
use sayahat_storage::{InterestMappingRepository, PlaceCatalog, PreferenceRepository};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const MAX_TRIP_DAYS: u32 = 14;
pub const MAX_BUDGET: i64 = 4;

#[derive(Clone)]
pub struct TripPlannerAgent<S>
where
    S: PlaceCatalog + PreferenceRepository + InterestMappingRepository,
{
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
    provider: String,
}

impl<S> TripPlannerAgent<S>
where
    S: PlaceCatalog + PreferenceRepository + InterestMappingRepository,
{
    pub fn new(store: Arc<S>, metrics: Arc<AppMetrics>, provider: impl Into<String>) -> Self {
        Self {
            store,
            metrics,
            provider: provider.into(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    /// Plans a trip for `user_id` (anonymous when `None`). A city without
    /// cached places surfaces as [`sayahat_core::PlannerError`] inside the
    /// returned error.
    #[instrument(
        skip(self, request),
        fields(plan_id = %Uuid::new_v4(), city = %request.city, days = request.days)
    )]
    pub async fn plan_trip(&self, user_id: Option<&str>, request: TripRequest) -> Result<TripPlan> {
        let started = Instant::now();
        self.metrics.inc_plan_requested();

        validate_request(&request)?;

        let preferences = match (request.use_preferences, user_id) {
            (true, Some(user_id)) => self.store.load_preferences(user_id).await?,
            _ => None,
        };
        let places = self.store.places_in_city(&request.city).await?;
        let synonyms = InterestSynonyms::new(self.store.interest_mappings(&self.provider).await?);

        let plan = match build_trip_plan(&request, preferences.as_ref(), &places, &synonyms) {
            Ok(plan) => plan,
            Err(err) => {
                self.metrics.inc_no_places();
                warn!(error = %err, "trip plan rejected");
                return Err(err.into());
            }
        };

        self.metrics.inc_plan_built();
        if plan.diagnostics.filter_fallback {
            self.metrics.inc_filter_fallback();
        }
        if plan.days_generated < plan.days_requested {
            self.metrics.inc_short_plan();
        }
        self.metrics.observe_latency(started.elapsed());

        info!(
            user = user_id.unwrap_or("anonymous"),
            places = places.len(),
            days_generated = plan.days_generated,
            stored_preferences = preferences.is_some(),
            far_days = plan.diagnostics.far_days.len(),
            "trip plan built"
        );

        Ok(plan)
    }

    /// Effective interest -> place-type table for the configured provider.
    pub async fn interest_table(&self) -> Result<BTreeMap<String, Vec<String>>> {
        let stored = self.store.interest_mappings(&self.provider).await?;
        Ok(InterestSynonyms::new(stored).effective_table())
    }
}

fn validate_request(request: &TripRequest) -> Result<()> {
    if request.city.trim().is_empty() {
        bail!("city must not be blank");
    }
    if request.days == 0 || request.days > MAX_TRIP_DAYS {
        bail!("days must be between 1 and {}", MAX_TRIP_DAYS);
    }
    if let Some(budget) = request.budget {
        if !(0..=MAX_BUDGET).contains(&budget) {
            bail!("budget must be between 0 and {}", MAX_BUDGET);
        }
    }
    Ok(())
}
