use kubeflake::{Kubeflake, Settings, StatefulSetIdentity};

/// Run the production identity path. Outside a cluster, stand in for the
/// Downward API and the metadata server with:
///
///   POD_NAME=keygen-3 GCP_ZONE=europe-west2-a cargo run --example statefulset
fn main() {
    let identity = StatefulSetIdentity::new();

    let generator = match Kubeflake::new(Settings::builder(identity).build()) {
        Ok(generator) => generator,
        Err(err) => {
            eprintln!("failed to create generator: {err}");
            std::process::exit(1);
        }
    };

    println!(
        "resolved identity: cluster {} machine {}",
        generator.cluster_id(),
        generator.machine_id()
    );

    for _ in 0..5 {
        match generator.next_key() {
            Ok(key) => println!("{key}"),
            Err(err) => {
                eprintln!("failed to generate key: {err}");
                std::process::exit(1);
            }
        }
    }
}
