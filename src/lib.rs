//! # Kubeflake
//!
//! A coordination-free, Snowflake-like distributed key generator for
//! Kubernetes StatefulSets running on GCP.
//!
//! Generate 64-bit unique identifiers (and their base62 key form) that are:
//! - 📈 Time-sorted
//! - 🔄 Monotonic per instance
//! - 🔒 Thread-safe
//! - 🌐 Distributed-ready with zero coordination
//!
//! Every instance derives its machine ID from its StatefulSet pod ordinal
//! and its cluster ID from the GCP zone its node runs in, so any number of
//! replicas across any number of clusters can mint keys concurrently
//! without ever talking to each other.

#![forbid(unsafe_code)]

pub mod base62;
mod clock;
mod error;
mod generator;
pub mod identity;
mod settings;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use error::KubeflakeError;
pub use generator::{IdParts, Kubeflake};
pub use identity::{IdentityError, IdentitySource, StatefulSetIdentity, StaticIdentity};
pub use settings::{Settings, SettingsBuilder};

// Re-export base62 types at crate root for convenience
pub use base62::{decode as base62_decode, encode as base62_encode};
pub use base62::{Base62, KeyCodec};
