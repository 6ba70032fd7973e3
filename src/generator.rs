//! Core Kubeflake generator implementation

use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::base62::KeyCodec;
use crate::clock::{unix_nanos, Clock};
use crate::error::KubeflakeError;
use crate::settings::{
    Settings, DEFAULT_BITS_CLUSTER, DEFAULT_BITS_MACHINE, DEFAULT_BITS_SEQUENCE,
    DEFAULT_EPOCH_SECS, DEFAULT_TIME_UNIT_MS,
};

const MIN_BITS_TIME: u8 = 32;
const MIN_BITS_SEQUENCE: u8 = 8;
const MAX_BITS_SEQUENCE: u8 = 30;
const MIN_BITS_CLUSTER: u8 = 2;
const MAX_BITS_CLUSTER: u8 = 8;
const MIN_BITS_MACHINE: u8 = 3;
const MAX_BITS_MACHINE: u8 = 16;

/// The four fields of a packed ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParts {
    /// Elapsed internal time ticks since the configured epoch
    pub timestamp: u64,
    /// Sequence number within the tick
    pub sequence: u32,
    /// Machine ID (StatefulSet pod ordinal in production)
    pub machine_id: u16,
    /// Cluster ID (zone index in production)
    pub cluster_id: u16,
}

/// Mutable per-instance state, guarded by one mutex. The lock is held
/// across the entire transition of [`Kubeflake::next_id`], including the
/// backpressure sleep on sequence exhaustion.
#[derive(Debug)]
struct State {
    elapsed: u64,
    sequence: u32,
}

/// A Kubeflake instance: mints packed 64-bit IDs and their base62 key
/// form, unique across all instances that were configured with distinct
/// `(cluster_id, machine_id)` pairs and strictly increasing per instance.
pub struct Kubeflake {
    bits_time: u8,
    bits_sequence: u8,
    bits_cluster: u8,
    bits_machine: u8,
    sequence_mask: u32,

    /// Nanoseconds per internal tick
    time_unit: i64,
    /// Internal tick of the configured epoch
    start_tick: i64,

    cluster_id: u16,
    machine_id: u16,

    codec: Box<dyn KeyCodec>,
    clock: Box<dyn Clock>,
    state: Mutex<State>,
}

impl std::fmt::Debug for Kubeflake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kubeflake")
            .field("bits_time", &self.bits_time)
            .field("bits_sequence", &self.bits_sequence)
            .field("bits_cluster", &self.bits_cluster)
            .field("bits_machine", &self.bits_machine)
            .field("sequence_mask", &self.sequence_mask)
            .field("time_unit", &self.time_unit)
            .field("start_tick", &self.start_tick)
            .field("cluster_id", &self.cluster_id)
            .field("machine_id", &self.machine_id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Kubeflake {
    /// Create a new Kubeflake configured with the given [`Settings`].
    ///
    /// Validation happens here, exactly once. `new` returns an error when:
    /// - a bit width is outside its supported range
    /// - the time unit is negative or shorter than one millisecond
    /// - the epoch is ahead of the current time
    /// - the widths leave fewer than 32 bits for the time field
    /// - the identity source fails, or returns an ID outside its bit range
    pub fn new(settings: Settings) -> Result<Self, KubeflakeError> {
        let bits_sequence = match settings.bits_sequence {
            0 => DEFAULT_BITS_SEQUENCE,
            bits if !(MIN_BITS_SEQUENCE..=MAX_BITS_SEQUENCE).contains(&bits) => {
                return Err(KubeflakeError::InvalidBitsSequence { bits })
            }
            bits => bits,
        };
        let bits_machine = match settings.bits_machine {
            0 => DEFAULT_BITS_MACHINE,
            bits if !(MIN_BITS_MACHINE..=MAX_BITS_MACHINE).contains(&bits) => {
                return Err(KubeflakeError::InvalidBitsMachineId { bits })
            }
            bits => bits,
        };
        let bits_cluster = match settings.bits_cluster {
            0 => DEFAULT_BITS_CLUSTER,
            bits if !(MIN_BITS_CLUSTER..=MAX_BITS_CLUSTER).contains(&bits) => {
                return Err(KubeflakeError::InvalidBitsClusterId { bits })
            }
            bits => bits,
        };

        let time_unit = if settings.time_unit.is_zero() {
            TimeDelta::milliseconds(DEFAULT_TIME_UNIT_MS)
        } else if settings.time_unit < TimeDelta::milliseconds(1) {
            // Covers both negative units and positive ones below 1ms
            return Err(KubeflakeError::InvalidTimeUnit);
        } else {
            settings.time_unit
        };

        let epoch = settings
            .epoch
            .unwrap_or_else(|| DateTime::from_timestamp(DEFAULT_EPOCH_SECS, 0).unwrap_or_default());
        if epoch > settings.clock.now() {
            return Err(KubeflakeError::StartTimeAhead);
        }

        let bits_time = 64 - bits_sequence - bits_cluster - bits_machine;
        if bits_time < MIN_BITS_TIME {
            return Err(KubeflakeError::InvalidBitsTime { bits: bits_time });
        }

        let cluster_id = settings.identity.cluster_id()?;
        let max_cluster = ((1u32 << bits_cluster) - 1) as u16;
        if cluster_id > max_cluster {
            return Err(KubeflakeError::InvalidClusterId {
                value: cluster_id,
                max: max_cluster,
            });
        }

        let machine_id = settings.identity.machine_id()?;
        let max_machine = ((1u32 << bits_machine) - 1) as u16;
        if machine_id > max_machine {
            return Err(KubeflakeError::InvalidMachineId {
                value: machine_id,
                max: max_machine,
            });
        }

        let time_unit_nanos = time_unit.num_nanoseconds().unwrap_or(i64::MAX);
        let start_tick = unix_nanos(epoch) / time_unit_nanos;

        debug!(
            cluster_id,
            machine_id, bits_time, bits_sequence, bits_cluster, bits_machine, "kubeflake ready"
        );

        Ok(Self {
            bits_time,
            bits_sequence,
            bits_cluster,
            bits_machine,
            sequence_mask: (1u32 << bits_sequence) - 1,
            time_unit: time_unit_nanos,
            start_tick,
            cluster_id,
            machine_id,
            codec: settings.codec,
            clock: settings.clock,
            state: Mutex::new(State {
                elapsed: 0,
                sequence: 0,
            }),
        })
    }

    /// Generate the next unique ID.
    ///
    /// IDs are strictly increasing across successive calls on one
    /// instance. Once the elapsed time overflows the time field the
    /// instance fails permanently with [`KubeflakeError::OverTimeLimit`].
    pub fn next_id(&self) -> Result<u64, KubeflakeError> {
        let mut state = self.state.lock();

        let current = self.current_elapsed();
        if state.elapsed < current {
            state.elapsed = current;
            state.sequence = 0;
        } else {
            state.sequence = (state.sequence + 1) & self.sequence_mask;
            if state.sequence == 0 {
                // Sequence space for this tick is exhausted. Claim the next
                // tick and block until the wall clock has reached it, so the
                // time field never runs ahead of real time.
                state.elapsed += 1;
                let overtime = state.elapsed - current;
                trace!(overtime, "sequence exhausted, waiting for next tick");
                self.sleep(overtime);
            }
        }

        self.to_id(state.elapsed, state.sequence)
    }

    /// Generate the next unique ID as a codec-encoded key.
    pub fn next_key(&self) -> Result<String, KubeflakeError> {
        let id = self.next_id()?;
        Ok(self.codec.encode(id))
    }

    /// Pack arbitrary field values into an ID.
    ///
    /// Pure and stateless; used for testing and key introspection. Each
    /// field is validated against the instance's configured widths.
    pub fn compose(
        &self,
        t: DateTime<Utc>,
        sequence: u32,
        machine_id: u16,
        cluster_id: u16,
    ) -> Result<u64, KubeflakeError> {
        let internal = self.to_internal_time(t);
        if internal < self.start_tick {
            return Err(KubeflakeError::StartTimeAhead);
        }
        let elapsed = (internal - self.start_tick) as u64;
        if elapsed >= 1u64 << self.bits_time {
            return Err(KubeflakeError::OverTimeLimit);
        }

        if sequence > self.sequence_mask {
            return Err(KubeflakeError::InvalidSequence {
                value: sequence,
                max: self.sequence_mask,
            });
        }

        let max_cluster = ((1u32 << self.bits_cluster) - 1) as u16;
        if cluster_id > max_cluster {
            return Err(KubeflakeError::InvalidClusterId {
                value: cluster_id,
                max: max_cluster,
            });
        }

        let max_machine = ((1u32 << self.bits_machine) - 1) as u16;
        if machine_id > max_machine {
            return Err(KubeflakeError::InvalidMachineId {
                value: machine_id,
                max: max_machine,
            });
        }

        Ok(self.pack(elapsed, sequence, cluster_id, machine_id))
    }

    /// [`Self::compose`] with the result codec-encoded.
    pub fn compose_key(
        &self,
        t: DateTime<Utc>,
        sequence: u32,
        machine_id: u16,
        cluster_id: u16,
    ) -> Result<String, KubeflakeError> {
        let id = self.compose(t, sequence, machine_id, cluster_id)?;
        Ok(self.codec.encode(id))
    }

    /// Split an ID into its four fields. Pure bit extraction; never fails.
    pub fn decompose(&self, id: u64) -> IdParts {
        let shift_sequence = (self.bits_machine + self.bits_cluster) as u32;
        let shift_time = shift_sequence + self.bits_sequence as u32;

        IdParts {
            timestamp: id >> shift_time,
            sequence: ((id >> shift_sequence) as u32) & self.sequence_mask,
            machine_id: (id & ((1u64 << self.bits_machine) - 1)) as u16,
            cluster_id: ((id >> self.bits_machine) & ((1u64 << self.bits_cluster) - 1)) as u16,
        }
    }

    /// Decode a key and split the ID into its four fields.
    pub fn decompose_key(&self, key: &str) -> Result<IdParts, KubeflakeError> {
        let id = self.codec.decode(key)?;
        Ok(self.decompose(id))
    }

    /// Bit width of the time field
    pub fn bits_time(&self) -> u8 {
        self.bits_time
    }

    /// Bit width of the sequence field
    pub fn bits_sequence(&self) -> u8 {
        self.bits_sequence
    }

    /// Bit width of the cluster ID field
    pub fn bits_cluster(&self) -> u8 {
        self.bits_cluster
    }

    /// Bit width of the machine ID field
    pub fn bits_machine(&self) -> u8 {
        self.bits_machine
    }

    /// Cluster ID baked into every ID minted by this instance
    pub fn cluster_id(&self) -> u16 {
        self.cluster_id
    }

    /// Machine ID baked into every ID minted by this instance
    pub fn machine_id(&self) -> u16 {
        self.machine_id
    }

    /// Internal time tick of `t` (ticks since the Unix epoch).
    fn to_internal_time(&self, t: DateTime<Utc>) -> i64 {
        unix_nanos(t) / self.time_unit
    }

    /// Elapsed ticks since the configured epoch of `t`, for tests needing
    /// the expected time field of a composed ID.
    #[cfg(test)]
    pub(crate) fn internal_elapsed(&self, t: DateTime<Utc>) -> u64 {
        (self.to_internal_time(t) - self.start_tick).max(0) as u64
    }

    fn current_elapsed(&self) -> u64 {
        (self.to_internal_time(self.clock.now()) - self.start_tick).max(0) as u64
    }

    /// Sleep until the wall clock reaches the tick the generator just
    /// claimed: the remaining fraction of the current tick plus the
    /// overshoot of ticks advanced. Bounded by `overtime` time units.
    fn sleep(&self, overtime: u64) {
        let nanos =
            overtime as i64 * self.time_unit - unix_nanos(self.clock.now()) % self.time_unit;
        if nanos > 0 {
            thread::sleep(Duration::from_nanos(nanos as u64));
        }
    }

    fn to_id(&self, elapsed: u64, sequence: u32) -> Result<u64, KubeflakeError> {
        if elapsed >= 1u64 << self.bits_time {
            return Err(KubeflakeError::OverTimeLimit);
        }
        Ok(self.pack(elapsed, sequence, self.cluster_id, self.machine_id))
    }

    fn pack(&self, elapsed: u64, sequence: u32, cluster_id: u16, machine_id: u16) -> u64 {
        elapsed << ((self.bits_sequence + self.bits_cluster + self.bits_machine) as u32)
            | (sequence as u64) << ((self.bits_machine + self.bits_cluster) as u32)
            | (cluster_id as u64) << (self.bits_machine as u32)
            | machine_id as u64
    }
}
