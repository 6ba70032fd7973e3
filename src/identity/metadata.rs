//! GCP zone discovery
//!
//! Resolves the zone of the node this process runs on. Environment
//! overrides (`GCP_ZONE`, `ZONE`) are checked first so tests and non-GCP
//! environments never touch the network; otherwise the GCE instance
//! metadata endpoint is queried once:
//!
//!   http://metadata.google.internal/computeMetadata/v1/instance/zone
//!
//! The query requires the `Metadata-Flavor: Google` header and answers
//! with `projects/<number>/zones/<zone>`; only the trailing zone token is
//! kept.

use std::time::Duration;

use tracing::debug;

use super::IdentityError;

const DEFAULT_METADATA_HOST: &str = "http://metadata.google.internal";
const ZONE_PATH: &str = "/computeMetadata/v1/instance/zone";
const METADATA_TIMEOUT: Duration = Duration::from_secs(2);

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Discover the zone of the current node.
pub(super) fn discover_zone(env: &EnvLookup) -> Result<String, IdentityError> {
    for key in ["GCP_ZONE", "ZONE"] {
        if let Some(zone) = env(key).map(|raw| raw.trim().to_string()) {
            if !zone.is_empty() {
                return Ok(zone);
            }
        }
    }

    // Metadata host override per GCE conventions
    let base = match env("GCE_METADATA_HOST").map(|raw| raw.trim().to_string()) {
        Some(host) if !host.is_empty() => {
            if host.starts_with("http://") || host.starts_with("https://") {
                host
            } else {
                format!("http://{host}")
            }
        }
        _ => DEFAULT_METADATA_HOST.to_string(),
    };

    let url = format!("{base}{ZONE_PATH}");
    debug!(url = %url, "querying metadata server for zone");
    let body = fetch_zone(&url)?;

    match zone_token(&body) {
        Some(zone) => Ok(zone.to_string()),
        None => Err(IdentityError::ZoneNotFound {
            zone: body.trim().to_string(),
        }),
    }
}

fn fetch_zone(url: &str) -> Result<String, IdentityError> {
    let unavailable = |reason: String| IdentityError::MetadataUnavailable { reason };

    let client = reqwest::blocking::Client::builder()
        .timeout(METADATA_TIMEOUT)
        .build()
        .map_err(|err| unavailable(err.to_string()))?;
    let response = client
        .get(url)
        .header("Metadata-Flavor", "Google")
        .send()
        .map_err(|err| unavailable(err.to_string()))?;
    if !response.status().is_success() {
        return Err(unavailable(format!("status {}", response.status())));
    }
    response.text().map_err(|err| unavailable(err.to_string()))
}

/// The trailing zone token of a metadata response, with any
/// `projects/<number>/zones/` style prefix stripped. `None` when nothing
/// usable remains.
fn zone_token(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let token = match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_token_strips_path_prefix() {
        assert_eq!(
            zone_token("projects/1234/zones/us-central1-a"),
            Some("us-central1-a")
        );
        assert_eq!(zone_token("europe-west2-a"), Some("europe-west2-a"));
        assert_eq!(zone_token("  asia-east1-b\n"), Some("asia-east1-b"));
    }

    #[test]
    fn test_zone_token_rejects_empty() {
        assert_eq!(zone_token(""), None);
        assert_eq!(zone_token("   "), None);
        assert_eq!(zone_token("projects/1234/zones/"), None);
    }

    #[test]
    fn test_env_override_order() {
        let env = |key: &str| match key {
            "ZONE" => Some("us-west1-a".to_string()),
            _ => None,
        };
        assert_eq!(discover_zone(&env).unwrap(), "us-west1-a");

        let env = |key: &str| match key {
            "GCP_ZONE" => Some(" europe-north1-a ".to_string()),
            "ZONE" => Some("us-west1-a".to_string()),
            _ => None,
        };
        assert_eq!(discover_zone(&env).unwrap(), "europe-north1-a");
    }
}
