//! Settings validation tests

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use crate::tests::test_utils::{test_epoch, test_settings, FailingIdentity};
    use crate::{IdentityError, Kubeflake, KubeflakeError, Settings, StaticIdentity};

    #[test]
    fn test_valid_settings() {
        let generator = Kubeflake::new(test_settings().build()).unwrap();
        assert_eq!(generator.bits_sequence(), 9);
        assert_eq!(generator.bits_cluster(), 3);
        assert_eq!(generator.bits_machine(), 13);
        assert_eq!(generator.bits_time(), 39);
    }

    #[test]
    fn test_unset_widths_fall_back_to_defaults() {
        let settings = Settings::builder(StaticIdentity::new(2, 5)).build();
        let generator = Kubeflake::new(settings).unwrap();
        assert_eq!(generator.bits_sequence(), 9);
        assert_eq!(generator.bits_cluster(), 3);
        assert_eq!(generator.bits_machine(), 13);
        assert_eq!(generator.bits_time(), 39);
    }

    #[test]
    fn test_bits_sequence_bounds() {
        for bits in [7u8, 31] {
            let err = Kubeflake::new(test_settings().bits_sequence(bits).build()).unwrap_err();
            assert_eq!(err, KubeflakeError::InvalidBitsSequence { bits });
        }
    }

    #[test]
    fn test_bits_machine_bounds() {
        for bits in [2u8, 17] {
            let err = Kubeflake::new(test_settings().bits_machine(bits).build()).unwrap_err();
            assert_eq!(err, KubeflakeError::InvalidBitsMachineId { bits });
        }
    }

    #[test]
    fn test_bits_cluster_bounds() {
        for bits in [1u8, 9] {
            let err = Kubeflake::new(test_settings().bits_cluster(bits).build()).unwrap_err();
            assert_eq!(err, KubeflakeError::InvalidBitsClusterId { bits });
        }
    }

    #[test]
    fn test_time_unit_negative() {
        let err = Kubeflake::new(
            test_settings()
                .time_unit(TimeDelta::milliseconds(-1))
                .build(),
        )
        .unwrap_err();
        assert_eq!(err, KubeflakeError::InvalidTimeUnit);
    }

    #[test]
    fn test_time_unit_below_one_millisecond() {
        let err = Kubeflake::new(
            test_settings()
                .time_unit(TimeDelta::microseconds(100))
                .build(),
        )
        .unwrap_err();
        assert_eq!(err, KubeflakeError::InvalidTimeUnit);
    }

    #[test]
    fn test_epoch_ahead_of_now() {
        // System clock here: the epoch must be compared against real time
        let settings = Settings::builder(StaticIdentity::new(2, 5))
            .epoch(Utc::now() + TimeDelta::hours(1))
            .build();
        let err = Kubeflake::new(settings).unwrap_err();
        assert_eq!(err, KubeflakeError::StartTimeAhead);
    }

    #[test]
    fn test_bits_time_too_small() {
        // 64 - (30 + 16 + 8) = 10 < 32
        let err = Kubeflake::new(
            test_settings()
                .bits_sequence(30)
                .bits_machine(16)
                .bits_cluster(8)
                .build(),
        )
        .unwrap_err();
        assert_eq!(err, KubeflakeError::InvalidBitsTime { bits: 10 });
    }

    #[test]
    fn test_identity_failure_aborts_construction() {
        let settings = Settings::builder(FailingIdentity)
            .epoch(test_epoch())
            .build();
        let err = Kubeflake::new(settings).unwrap_err();
        assert_eq!(
            err,
            KubeflakeError::Identity(IdentityError::MetadataUnavailable {
                reason: "injected failure".to_string()
            })
        );
    }

    #[test]
    fn test_identity_values_are_stored() {
        let generator = Kubeflake::new(test_settings().build()).unwrap();
        assert_eq!(generator.cluster_id(), 2);
        assert_eq!(generator.machine_id(), 5);

        let parts = generator.decompose(generator.next_id().unwrap());
        assert_eq!(parts.cluster_id, 2);
        assert_eq!(parts.machine_id, 5);
    }

    #[test]
    fn test_identity_values_must_fit_their_widths() {
        // cluster 300 needs more than the 3 configured bits
        let err = Kubeflake::new(
            Settings::builder(StaticIdentity::new(300, 5))
                .bits_cluster(3)
                .epoch(test_epoch())
                .build(),
        )
        .unwrap_err();
        assert_eq!(err, KubeflakeError::InvalidClusterId { value: 300, max: 7 });

        let err = Kubeflake::new(
            Settings::builder(StaticIdentity::new(2, 9000))
                .bits_machine(13)
                .epoch(test_epoch())
                .build(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            KubeflakeError::InvalidMachineId {
                value: 9000,
                max: 8191
            }
        );
    }
}
