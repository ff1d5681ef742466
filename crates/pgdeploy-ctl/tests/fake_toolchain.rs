#![cfg(unix)]

use std::time::Duration;

use pgdeploy_ctl::{ClusterCreationOptions, CtlError, PgCtl, ServerStatus, run_initdb};
use pgdeploy_test_support::fake_bin::FakeToolchain;

#[test]
fn lifecycle_against_fake_pg_ctl() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let toolchain = FakeToolchain::install(&temp.path().join("pg"))?;
    let data = temp.path().join("data");
    run_initdb(&toolchain.initdb(), &data, &ClusterCreationOptions::default())?;

    let log = temp.path().join("server.log");
    let ctl = PgCtl::new(toolchain.pg_ctl(), &data).with_wait_timeout(Duration::from_secs(30));

    assert_eq!(ctl.status(None), ServerStatus::Stopped);
    ctl.start(Some(&log))?;
    assert_eq!(ctl.status(None), ServerStatus::Active);
    ctl.reload(None)?;
    ctl.restart(Some(&log))?;
    ctl.stop(None)?;
    assert_eq!(ctl.status(None), ServerStatus::Stopped);

    let calls = toolchain.calls("pg_ctl");
    let data_arg = data.display().to_string();
    assert_eq!(
        calls[1],
        format!("-D {data_arg} -l {} start -w -t 30", log.display())
    );
    assert!(std::fs::read_to_string(&log)?.contains("pg_ctl start"));
    Ok(())
}

#[test]
fn stopping_a_stopped_server_fails_with_stderr() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let toolchain = FakeToolchain::install(temp.path())?;
    let ctl = PgCtl::new(toolchain.pg_ctl(), temp.path().join("data"));

    match ctl.stop(None) {
        Err(CtlError::ProcessFailed { code, stderr, .. }) => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("does not exist"), "{stderr}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn initdb_receives_creation_options() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let toolchain = FakeToolchain::install(temp.path())?;
    let data = temp.path().join("cluster");
    let options = ClusterCreationOptions::default()
        .with_superuser("postgres")
        .with_data_checksums(true);
    let output = run_initdb(&toolchain.initdb(), &data, &options)?;
    assert!(output.contains("Success"));
    assert_eq!(
        toolchain.calls("initdb"),
        [format!("-D {} -E UTF8 -U postgres -k", data.display())]
    );
    Ok(())
}

#[test]
fn real_toolchain_round_trip() -> anyhow::Result<()> {
    let Some(bin) = pgdeploy_test_support::fixtures::postgres_bin_dir() else {
        eprintln!("skipping real_toolchain_round_trip: PGDEPLOY_TEST_PG_BIN not usable");
        return Ok(());
    };
    let temp = tempfile::tempdir()?;
    let data = temp.path().join("data");
    run_initdb(&bin.join("initdb"), &data, &ClusterCreationOptions::default())?;
    let ctl = PgCtl::new(bin.join("pg_ctl"), &data);
    let log = temp.path().join("server.log");
    ctl.start(Some(&log))?;
    assert_eq!(ctl.status(None), ServerStatus::Active);
    ctl.stop(None)?;
    Ok(())
}
