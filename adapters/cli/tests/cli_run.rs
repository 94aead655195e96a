use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    let assets = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/structure");
    Command::new(env!("CARGO_BIN_EXE_nether-reactor"))
        .env("RUST_LOG", "warn")
        .args(["--assets", assets])
        .args(args)
        .output()
        .expect("failed to launch the nether-reactor binary")
}

#[test]
fn bundled_reactor_runs_to_completion() {
    let output = run_cli(&["--seed", "7"]);
    assert!(output.status.success(), "cli exited with {:?}", output.status);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tile.netherreactor.active"), "{stdout}");
    assert!(stdout.contains("phase used, progress 921"), "{stdout}");
    assert!(stdout.contains("night fell at time of day 15000"), "{stdout}");
}

#[test]
fn short_runs_leave_the_reactor_active() {
    let output = run_cli(&["--ticks", "100", "--difficulty", "peaceful", "--no-creatures"]);
    assert!(output.status.success(), "cli exited with {:?}", output.status);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("phase active, progress 100"), "{stdout}");
    assert!(stdout.contains("0 creatures"), "{stdout}");
    assert!(stdout.contains("difficulty Peaceful"), "{stdout}");
}

#[test]
fn info_logging_reports_the_finished_run() {
    let assets = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/structure");
    let output = Command::new(env!("CARGO_BIN_EXE_nether-reactor"))
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1")
        .args(["--assets", assets, "--ticks", "10"])
        .output()
        .expect("failed to launch the nether-reactor binary");
    assert!(output.status.success(), "cli exited with {:?}", output.status);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nether reactor activated"), "{stdout}");
    assert!(stdout.contains("reactor run complete"), "{stdout}");
}

#[test]
fn missing_assets_fail_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_nether-reactor"))
        .args(["--assets", "/nonexistent/structure"])
        .output()
        .expect("failed to launch the nether-reactor binary");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load structure"), "{stderr}");
}
