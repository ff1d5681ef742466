#![cfg(unix)]

use pgdeploy_core::{ClusterCreationOptions, ConfigAction, PgDeploy, ServerStatus};
use pgdeploy_test_support::fixtures::postgres_bin_dir;

#[test]
fn real_cluster_round_trip() -> anyhow::Result<()> {
    let Some(bin) = postgres_bin_dir() else {
        eprintln!("skipping real_cluster_round_trip: PGDEPLOY_TEST_PG_BIN not set or unusable");
        return Ok(());
    };
    let Some(root) = bin.parent() else {
        eprintln!("skipping real_cluster_round_trip: {} has no parent", bin.display());
        return Ok(());
    };

    let temp = tempfile::tempdir()?;
    let data = temp.path().join("data");
    let log = temp.path().join("server.log");
    let installation = PgDeploy::new().retrieve_installation(root)?;
    let cluster = installation.create_cluster(
        &data,
        &ClusterCreationOptions::default().with_superuser("postgres"),
    )?;

    let socket_dir = format!("'{}'", temp.path().display());
    let isolated = cluster
        .config_builder()
        .with_property("listen_addresses", "''")?
        .with_property("unix_socket_directories", socket_dir.as_str())?
        .with_property("port", 55_432)?
        .build();
    assert_eq!(
        cluster.apply_config(&isolated, Some(&log))?.action(),
        ConfigAction::None
    );

    cluster.start(Some(&log))?;
    assert_eq!(cluster.status(Some(&log)), ServerStatus::Active);

    let tuned = cluster.config_builder().with_property("work_mem", "8MB")?.build();
    let outcome = cluster.apply_config(&tuned, Some(&log))?;
    assert_eq!(outcome.action(), ConfigAction::Reload);

    cluster.stop(Some(&log))?;
    assert_eq!(cluster.status(Some(&log)), ServerStatus::Stopped);
    Ok(())
}
