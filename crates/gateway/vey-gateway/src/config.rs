use serde::{Deserialize, Serialize};

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Maximum accepted clock skew for shipping-request timestamps, in
    /// seconds, applied in both directions.
    #[serde(default = "default_max_timestamp_skew_secs")]
    pub max_timestamp_skew_secs: i64,
}

fn default_max_timestamp_skew_secs() -> i64 {
    300
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { max_timestamp_skew_secs: default_max_timestamp_skew_secs() }
    }
}
