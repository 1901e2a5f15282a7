//! CLI configuration from environment.

use archwalk_core::RouteOptions;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub speed_kmh: f64,
    pub max_swaps: usize,
    /// Extra tracing directive applied on top of `RUST_LOG`
    pub log_directive: String,
}

impl Default for Config {
    fn default() -> Self {
        let route = RouteOptions::default();
        Self {
            speed_kmh: route.speed_kmh,
            max_swaps: route.max_swaps,
            log_directive: "archwalk_core=info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            speed_kmh: env::var("ARCHWALK_SPEED_KMH")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|speed: &f64| speed.is_finite() && *speed > 0.0)
                .unwrap_or(defaults.speed_kmh),
            max_swaps: env::var("ARCHWALK_MAX_SWAPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_swaps),
            log_directive: env::var("ARCHWALK_LOG").unwrap_or(defaults.log_directive),
        }
    }

    /// Route options with command-line overrides applied over this config.
    pub fn route_options(&self, speed_kmh: Option<f64>, max_swaps: Option<usize>) -> RouteOptions {
        RouteOptions {
            speed_kmh: speed_kmh.unwrap_or(self.speed_kmh),
            max_swaps: max_swaps.unwrap_or(self.max_swaps),
        }
    }
}
