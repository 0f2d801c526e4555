//! Process-wide configuration, loaded once at startup and never again.
//!
//! Grounded in the original's `env.py`: every value is a required
//! environment variable and a missing one fails the process before it ever
//! binds a socket (§7 Configuration policy: "fail startup").

use std::env;
use std::time::Duration;

use crate::error::PlannerError;

/// Per-call deadline for both external collaborators (§5: "both external
/// collaborators must honour a per-call deadline").
pub const COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    pub version: String,
    pub vroouty_url: String,
    pub osrm_jeju_url: String,
    pub atlan_wrapper_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, PlannerError> {
        Ok(Config {
            version: required_env("VERSION")?,
            vroouty_url: required_env("VROOUTY_URL")?,
            osrm_jeju_url: required_env("OSRM_JEJU_URL")?,
            atlan_wrapper_url: required_env("ATLAN_WRAPPER_URL")?,
        })
    }

    /// The routing collaborator base URL for a vehicle profile: `car` uses
    /// the OSRM Jeju deployment, anything else uses the Atlan wrapper.
    pub fn routing_base_url(&self, profile: &str) -> &str {
        if profile == "car" {
            &self.osrm_jeju_url
        } else {
            &self.atlan_wrapper_url
        }
    }
}

fn required_env(key: &str) -> Result<String, PlannerError> {
    env::var(key).map_err(|_| {
        PlannerError::Configuration(format!("required environment variable {key} is not set"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_profile_routes_to_osrm_jeju() {
        let cfg = Config {
            version: "1".to_string(),
            vroouty_url: "http://solver".to_string(),
            osrm_jeju_url: "http://osrm".to_string(),
            atlan_wrapper_url: "http://atlan".to_string(),
        };
        assert_eq!(cfg.routing_base_url("car"), "http://osrm");
        assert_eq!(cfg.routing_base_url("atlan"), "http://atlan");
        assert_eq!(cfg.routing_base_url("anything-else"), "http://atlan");
    }

    #[test]
    fn missing_env_var_is_a_configuration_error() {
        std::env::remove_var("JEJU_ONUL_TEST_MISSING_VAR");
        let result = required_env("JEJU_ONUL_TEST_MISSING_VAR");
        assert!(matches!(result, Err(PlannerError::Configuration(_))));
    }
}
