//! Uniqueness and ordering under concurrent callers sharing one instance

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::TimeDelta;

    use crate::tests::test_utils::{
        assert_unique_and_monotonic, test_epoch, test_settings, StepClock,
    };
    use crate::{Kubeflake, Settings, StaticIdentity};

    #[test]
    fn test_concurrent_generation() {
        let generator = Arc::new(Kubeflake::new(test_settings().build()).unwrap());
        let num_threads = 8;
        let ids_per_thread = 500;
        let mut handles = Vec::with_capacity(num_threads);

        for _ in 0..num_threads {
            let generator = Arc::clone(&generator);
            handles.push(thread::spawn(move || {
                let mut local = Vec::with_capacity(ids_per_thread);
                for _ in 0..ids_per_thread {
                    local.push(generator.next_id().unwrap());
                }
                local
            }));
        }

        let mut all_ids = Vec::with_capacity(num_threads * ids_per_thread);
        for handle in handles {
            all_ids.extend(handle.join().expect("thread panicked"));
        }

        assert_unique_and_monotonic(all_ids, num_threads * ids_per_thread);
    }

    #[test]
    fn test_concurrent_generation_wall_clock() {
        // Same contention pattern against the real system clock
        let settings = Settings::builder(StaticIdentity::new(1, 1)).build();
        let generator = Arc::new(Kubeflake::new(settings).unwrap());
        let num_threads = 4;
        let ids_per_thread = 250;
        let mut handles = Vec::with_capacity(num_threads);

        for _ in 0..num_threads {
            let generator = Arc::clone(&generator);
            handles.push(thread::spawn(move || {
                (0..ids_per_thread)
                    .map(|_| generator.next_id().unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut all_ids = Vec::with_capacity(num_threads * ids_per_thread);
        for handle in handles {
            all_ids.extend(handle.join().expect("thread panicked"));
        }

        assert_unique_and_monotonic(all_ids, num_threads * ids_per_thread);
    }

    #[test]
    fn test_concurrent_keys_decode_to_unique_ids() {
        let generator = Arc::new(
            Kubeflake::new(
                test_settings()
                    .clock(StepClock::new(
                        test_epoch() + TimeDelta::seconds(30),
                        TimeDelta::milliseconds(1),
                    ))
                    .build(),
            )
            .unwrap(),
        );
        let num_threads = 4;
        let keys_per_thread = 200;
        let mut handles = Vec::with_capacity(num_threads);

        for _ in 0..num_threads {
            let generator = Arc::clone(&generator);
            handles.push(thread::spawn(move || {
                (0..keys_per_thread)
                    .map(|_| generator.next_key().unwrap())
                    .collect::<Vec<_>>()
            }));
        }

        let mut all_ids = Vec::with_capacity(num_threads * keys_per_thread);
        for handle in handles {
            for key in handle.join().expect("thread panicked") {
                all_ids.push(crate::base62::decode(&key).unwrap());
            }
        }

        assert_unique_and_monotonic(all_ids, num_threads * keys_per_thread);
    }
}
