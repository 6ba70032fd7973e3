//! Generator settings
//!
//! [`Settings`] collects everything [`Kubeflake::new`](crate::Kubeflake::new)
//! needs: the three field widths, the time unit, the epoch, the key codec,
//! the identity source and the clock. The builder only collects; all
//! validation happens exactly once, at construction.

use chrono::{DateTime, TimeDelta, Utc};

use crate::base62::{Base62, KeyCodec};
use crate::clock::{Clock, SystemClock};
use crate::identity::IdentitySource;

/// Default bit widths and time unit, applied when the builder leaves a
/// field unset (zero).
pub(crate) const DEFAULT_BITS_SEQUENCE: u8 = 9;
pub(crate) const DEFAULT_BITS_CLUSTER: u8 = 3;
pub(crate) const DEFAULT_BITS_MACHINE: u8 = 13;
pub(crate) const DEFAULT_TIME_UNIT_MS: i64 = 10;

/// Default epoch: 2025-01-01T00:00:00Z, expressed in seconds.
pub(crate) const DEFAULT_EPOCH_SECS: i64 = 1_735_689_600;

/// Configuration for a [`Kubeflake`](crate::Kubeflake) instance.
///
/// Bit widths of zero fall back to the documented defaults (sequence 9,
/// cluster 3, machine 13); a zero time unit falls back to 10 ms; an unset
/// epoch falls back to 2025-01-01 UTC. Out-of-range values are rejected by
/// [`Kubeflake::new`](crate::Kubeflake::new), never silently clamped.
pub struct Settings {
    pub(crate) bits_sequence: u8,
    pub(crate) bits_cluster: u8,
    pub(crate) bits_machine: u8,
    pub(crate) time_unit: TimeDelta,
    pub(crate) epoch: Option<DateTime<Utc>>,
    pub(crate) codec: Box<dyn KeyCodec>,
    pub(crate) identity: Box<dyn IdentitySource>,
    pub(crate) clock: Box<dyn Clock>,
}

impl Settings {
    /// Create a new builder. The identity source is the one input without
    /// a sensible default: it decides which cluster and machine the minted
    /// IDs belong to.
    pub fn builder(identity: impl IdentitySource + 'static) -> SettingsBuilder {
        SettingsBuilder::new(identity)
    }
}

/// Builder for [`Settings`]
pub struct SettingsBuilder {
    bits_sequence: u8,
    bits_cluster: u8,
    bits_machine: u8,
    time_unit: TimeDelta,
    epoch: Option<DateTime<Utc>>,
    codec: Box<dyn KeyCodec>,
    identity: Box<dyn IdentitySource>,
    clock: Box<dyn Clock>,
}

impl SettingsBuilder {
    pub fn new(identity: impl IdentitySource + 'static) -> Self {
        Self {
            bits_sequence: 0,
            bits_cluster: 0,
            bits_machine: 0,
            time_unit: TimeDelta::zero(),
            epoch: None,
            codec: Box::new(Base62),
            identity: Box::new(identity),
            clock: Box::new(SystemClock),
        }
    }

    /// Set the bit width of the sequence number (8-30)
    pub fn bits_sequence(mut self, bits: u8) -> Self {
        self.bits_sequence = bits;
        self
    }

    /// Set the bit width of the cluster ID (2-8)
    pub fn bits_cluster(mut self, bits: u8) -> Self {
        self.bits_cluster = bits;
        self
    }

    /// Set the bit width of the machine ID (3-16)
    pub fn bits_machine(mut self, bits: u8) -> Self {
        self.bits_machine = bits;
        self
    }

    /// Set the internal time unit. Must be at least one millisecond.
    pub fn time_unit(mut self, unit: TimeDelta) -> Self {
        self.time_unit = unit;
        self
    }

    /// Set the epoch since which elapsed time is counted. Must not be
    /// ahead of the current time.
    pub fn epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Replace the default base62 key codec
    pub fn codec(mut self, codec: impl KeyCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Replace the system clock, e.g. with a deterministic test clock
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn build(self) -> Settings {
        Settings {
            bits_sequence: self.bits_sequence,
            bits_cluster: self.bits_cluster,
            bits_machine: self.bits_machine,
            time_unit: self.time_unit,
            epoch: self.epoch,
            codec: self.codec,
            identity: self.identity,
            clock: self.clock,
        }
    }
}
