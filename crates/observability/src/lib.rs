use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    plans_requested_total: AtomicU64,
    plans_built_total: AtomicU64,
    no_places_total: AtomicU64,
    short_plans_total: AtomicU64,
    filter_fallback_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub plans_requested_total: u64,
    pub plans_built_total: u64,
    pub no_places_total: u64,
    pub short_plans_total: u64,
    pub filter_fallback_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_plan_requested(&self) {
        self.plans_requested_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sayahat_plans_requested_total").increment(1);
    }

    pub fn inc_plan_built(&self) {
        self.plans_built_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sayahat_plans_built_total").increment(1);
    }

    pub fn inc_no_places(&self) {
        self.no_places_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sayahat_no_places_total").increment(1);
    }

    pub fn inc_short_plan(&self) {
        self.short_plans_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sayahat_short_plans_total").increment(1);
    }

    pub fn inc_filter_fallback(&self) {
        self.filter_fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("sayahat_filter_fallback_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        metrics::histogram!("sayahat_plan_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.plans_requested_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            plans_requested_total: requests,
            plans_built_total: self.plans_built_total.load(Ordering::Relaxed),
            no_places_total: self.no_places_total.load(Ordering::Relaxed),
            short_plans_total: self.short_plans_total.load(Ordering::Relaxed),
            filter_fallback_total: self.filter_fallback_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,sayahat_agents=info,sayahat_storage=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
