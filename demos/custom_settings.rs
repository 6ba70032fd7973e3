use chrono::{TimeDelta, TimeZone, Utc};
use kubeflake::{Kubeflake, Settings, StaticIdentity};

fn main() {
    // 7 cluster bits and 10 machine bits cover 128 zones and 1024 pods
    // per zone; a 15-bit sequence keeps the time field at 32 bits.
    let generator = Kubeflake::new(
        Settings::builder(StaticIdentity::new(6, 42))
            .bits_cluster(7)
            .bits_machine(10)
            .bits_sequence(15)
            .time_unit(TimeDelta::milliseconds(1))
            .epoch(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
            .build(),
    )
    .expect("valid settings");

    println!(
        "time/sequence/cluster/machine bits: {}/{}/{}/{}",
        generator.bits_time(),
        generator.bits_sequence(),
        generator.bits_cluster(),
        generator.bits_machine()
    );

    let id = generator.next_id().expect("generate id");
    let parts = generator.decompose(id);
    println!("id {id} -> {parts:?}");
}
