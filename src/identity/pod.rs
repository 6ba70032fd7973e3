//! StatefulSet pod identity
//!
//! In a StatefulSet, pod names are formatted as `<set-name>-<ordinal>`,
//! e.g. `keygen-2`. The ordinal doubles as the machine ID; the GCP zone of
//! the pod's node, looked up in the zone index, is the cluster ID.

use tracing::debug;

use super::metadata::discover_zone;
use super::zones::ZoneTable;
use super::{IdentityError, IdentitySource};

type EnvFn = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;
type HostnameFn = Box<dyn Fn() -> Option<String> + Send + Sync>;

/// Identity of a pod running in a Kubernetes StatefulSet.
///
/// The pod name is read from, in order: the `POD_NAME` environment
/// variable (Downward API), the `HOSTNAME` environment variable
/// (Kubernetes sets this to the pod name by default), and the OS hostname
/// as a final fallback.
pub struct StatefulSetIdentity {
    /// Separates the base name from the ordinal
    delimiter: char,
    zones: &'static ZoneTable,

    // Lookups are injectable so resolution is testable without touching
    // process environment
    env: EnvFn,
    hostname: HostnameFn,
}

impl StatefulSetIdentity {
    pub fn new() -> Self {
        Self {
            delimiter: '-',
            zones: ZoneTable::builtin(),
            env: Box::new(|key| std::env::var(key).ok()),
            hostname: Box::new(|| {
                let name = gethostname::gethostname().into_string().ok()?;
                (!name.is_empty()).then_some(name)
            }),
        }
    }

    /// Use a different base-name/ordinal delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Use a different zone index table
    pub fn with_zone_table(mut self, zones: &'static ZoneTable) -> Self {
        self.zones = zones;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_env(mut self, env: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_hostname(mut self, hostname: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        self.hostname = Box::new(hostname);
        self
    }

    /// The pod's name, discovered from environment or hostname sources.
    pub fn pod_name(&self) -> Result<String, IdentityError> {
        // Preferred: Downward API provided POD_NAME
        if let Some(name) = (self.env)("POD_NAME").filter(|name| !name.is_empty()) {
            return Ok(name);
        }
        // Kubernetes typically sets HOSTNAME to the pod name
        if let Some(name) = (self.env)("HOSTNAME").filter(|name| !name.is_empty()) {
            return Ok(name);
        }
        // Fallback to the OS hostname
        if let Some(name) = (self.hostname)() {
            return Ok(name);
        }
        Err(IdentityError::PodNameNotFound)
    }

    /// The StatefulSet ordinal (0-based) parsed from the pod name. For a
    /// pod named `keygen-2` this returns 2.
    pub fn ordinal(&self) -> Result<u16, IdentityError> {
        let name = self.pod_name()?;
        let suffix = match name.rfind(self.delimiter) {
            Some(idx) if idx + 1 < name.len() => &name[idx + 1..],
            _ => return Err(IdentityError::OrdinalNotFound { name }),
        };
        suffix
            .parse::<u16>()
            .map_err(|_| IdentityError::OrdinalNotFound { name: name.clone() })
    }
}

impl Default for StatefulSetIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySource for StatefulSetIdentity {
    fn cluster_id(&self) -> Result<u16, IdentityError> {
        let zone = discover_zone(self.env.as_ref())?;
        let index = self
            .zones
            .zone_index(&zone)
            .ok_or(IdentityError::ZoneNotFound { zone: zone.clone() })?;
        debug!(zone = %zone, index, "resolved cluster id from zone");
        Ok(index)
    }

    fn machine_id(&self) -> Result<u16, IdentityError> {
        self.ordinal()
    }
}
