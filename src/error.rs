use thiserror::Error;

use crate::identity::IdentityError;

/// Represents errors that can occur during Kubeflake operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KubeflakeError {
    /// The configured widths left fewer than 32 bits for the time field
    #[error("bit length for time must be 32 or more, got {bits}")]
    InvalidBitsTime { bits: u8 },
    /// Sequence bit width outside the supported range [8, 30]
    #[error("invalid bit length for sequence number: {bits}")]
    InvalidBitsSequence { bits: u8 },
    /// Machine ID bit width outside the supported range [3, 16]
    #[error("invalid bit length for machine id: {bits}")]
    InvalidBitsMachineId { bits: u8 },
    /// Cluster ID bit width outside the supported range [2, 8]
    #[error("invalid bit length for cluster id: {bits}")]
    InvalidBitsClusterId { bits: u8 },
    /// Time unit is negative or shorter than one millisecond
    #[error("invalid time unit")]
    InvalidTimeUnit,
    /// Sequence number outside its declared bit range
    #[error("invalid sequence number {value}, maximum is {max}")]
    InvalidSequence { value: u32, max: u32 },
    /// Machine ID outside its declared bit range
    #[error("invalid machine id {value}, maximum is {max}")]
    InvalidMachineId { value: u16, max: u16 },
    /// Cluster ID outside its declared bit range
    #[error("invalid cluster id {value}, maximum is {max}")]
    InvalidClusterId { value: u16, max: u16 },
    /// Configured epoch is ahead of the current time
    #[error("start time is ahead")]
    StartTimeAhead,
    /// The elapsed time no longer fits in the time field. Permanent for
    /// this instance; remediation is reconfiguration and redeploy.
    #[error("over the time limit")]
    OverTimeLimit,
    /// The key is not a valid base62 rendering of a u64
    #[error("invalid base62 key")]
    InvalidBase,
    /// Identity resolution failed during construction
    #[error("identity resolution failed: {0}")]
    Identity(#[from] IdentityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let invalid_machine = KubeflakeError::InvalidMachineId {
            value: 8192,
            max: 8191,
        };
        assert_eq!(
            invalid_machine.to_string(),
            "invalid machine id 8192, maximum is 8191"
        );

        let over = KubeflakeError::OverTimeLimit;
        assert_eq!(over.to_string(), "over the time limit");
    }

    #[test]
    fn test_identity_error_wrapping() {
        let err: KubeflakeError = IdentityError::PodNameNotFound.into();
        assert!(matches!(
            err,
            KubeflakeError::Identity(IdentityError::PodNameNotFound)
        ));
        assert!(err.to_string().contains("pod name not found"));
    }

    #[test]
    fn test_error_clone() {
        let original = KubeflakeError::InvalidBitsSequence { bits: 31 };
        let cloned = original.clone();
        assert_eq!(original, cloned);
    }
}
