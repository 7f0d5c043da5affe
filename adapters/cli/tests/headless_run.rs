use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tower-defence"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to invoke tower-defence binary")
}

#[test]
fn bundled_scenario_replays_to_the_same_digest() {
    let args = ["--ticks", "400", "--auto-waves", "--build", "0@7,1"];
    let first = run(&args);
    let second = run(&args);

    assert!(first.status.success(), "tower-defence should exit cleanly");
    let stdout = String::from_utf8(first.stdout).expect("utf-8 output");
    assert!(stdout.contains("digest: "), "summary missing digest: {stdout}");
    assert!(stdout.contains("towers: 1"), "build order ignored: {stdout}");
    assert_eq!(stdout.as_bytes(), second.stdout.as_slice());
}

#[test]
fn malformed_build_order_is_rejected() {
    let output = run(&["--build", "0@seven"]);
    assert!(!output.status.success());
}

#[test]
fn missing_scenario_file_is_reported() {
    let output = run(&["--scenario", "does/not/exist.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"), "{stderr}");
}
