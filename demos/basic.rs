use chrono::{DateTime, TimeDelta, Utc};
use kubeflake::{Kubeflake, Settings, StaticIdentity};

fn main() {
    // Pin the identity directly; production pods would use
    // StatefulSetIdentity instead
    let generator = Kubeflake::new(Settings::builder(StaticIdentity::new(2, 5)).build())
        .expect("valid settings");

    println!("Generated keys (monotonic per instance):");
    for _ in 0..3 {
        let key = generator.next_key().expect("generate key");
        print_key(&key, &generator);
    }
}

fn print_key(key: &str, generator: &Kubeflake) {
    let parts = generator.decompose_key(key).expect("own keys decode");
    // Default settings: 10 ms ticks since 2025-01-01
    let epoch = DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap();
    let minted_at = epoch + TimeDelta::milliseconds(parts.timestamp as i64 * 10);

    println!(
        "  Key: {key}, minted: {minted_at}, cluster: {}, machine: {}, sequence: {}",
        parts.cluster_id, parts.machine_id, parts.sequence
    );
}
