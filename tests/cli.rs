use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_scene(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(xml.as_bytes()).expect("write scene");
    tmp
}

#[test]
fn summary_prints_scene_and_walks_character() {
    let scene = write_scene(
        r##"<scene>
  <graves><count>5</count></graves>
  <galaxy><count>500</count></galaxy>
  <object>
    <name>Crypt</name>
    <shape>box</shape>
    <position>6 0.5 -6</position>
  </object>
</scene>
"##,
    );
    let mut cmd = Command::cargo_bin("haunted-house").expect("binary exists");
    cmd.arg(scene.path())
        .args(["--summary-only", "--frames", "60", "--hold", "w", "--walk"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 14 objects (3 lights)"))
        .stdout(contains(" - Crypt (mesh)"))
        .stdout(contains(" - grave-4 (grave)"))
        .stdout(contains("Simulated 60 frames (1.00s)"))
        .stdout(contains("Character state=Walk run=false"))
        .stdout(contains(" - ghost-3 pos="))
        .stdout(contains("Galaxy points=500 branches=3"));
}

#[test]
fn tweaks_regenerate_galaxy() {
    let scene = write_scene("<scene><galaxy><count>200</count></galaxy></scene>");
    let mut cmd = Command::cargo_bin("haunted-house").expect("binary exists");
    cmd.arg(scene.path()).args([
        "--summary-only",
        "--frames",
        "1",
        "--tweak",
        "branches=5",
        "--tweak",
        "inside_color=#ffffff",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("Galaxy points=200 branches=5"))
        .stdout(contains("generation=3"));
}

#[test]
fn idle_character_stays_at_spawn() {
    let scene = write_scene("<scene><galaxy><count>100</count></galaxy></scene>");
    let mut cmd = Command::cargo_bin("haunted-house").expect("binary exists");
    cmd.arg(scene.path()).args(["--summary-only", "--frames", "30"]);
    cmd.assert()
        .success()
        .stdout(contains("Character state=Idle run=true pos=(0.00, 0.00, 4.00)"))
        .stdout(contains("Camera target=(0.00, 1.00, 4.00)"));
}

#[test]
fn out_of_range_tweak_fails() {
    let scene = write_scene("<scene><galaxy><count>100</count></galaxy></scene>");
    let mut cmd = Command::cargo_bin("haunted-house").expect("binary exists");
    cmd.arg(scene.path())
        .args(["--summary-only", "--tweak", "spin=50"]);
    cmd.assert()
        .failure()
        .stderr(contains("spin must lie in"));
}

#[test]
fn invalid_scene_reports_parse_error() {
    let scene = write_scene("<scene><fog><near>9</near><far>2</far></fog></scene>");
    let mut cmd = Command::cargo_bin("haunted-house").expect("binary exists");
    cmd.arg(scene.path()).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("failed to parse scene").and(contains("must exceed")));
}
