use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn framedeck(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("framedeck").unwrap();
    cmd.current_dir(dir);
    cmd
}

/// Write two PNG frames and a manifest describing them
fn write_manifest(dir: &Path) -> String {
    image::RgbImage::from_pixel(32, 18, image::Rgb([20, 20, 20]))
        .save(dir.join("a.png"))
        .unwrap();
    image::RgbImage::from_pixel(18, 32, image::Rgb([220, 40, 40]))
        .save(dir.join("b.png"))
        .unwrap();

    let manifest = serde_json::json!({
        "source": "/recordings/talk.mp4",
        "frames": [
            { "image": "a.png", "timestamp": 0.0 },
            { "image": "b.png", "timestamp": 61.5, "similarity": 212.0 }
        ]
    });
    let path = dir.join("manifest.json");
    std::fs::write(&path, manifest.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    framedeck(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_export_from_manifest() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();

    framedeck(dir.path())
        .args(["export", "--manifest", &manifest, "--out-dir"])
        .arg(&out)
        .args(["--title", "Conference Talk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 frames, 3 pages"));

    let pdf = std::fs::read(out.join("talk_frames.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_export_selected_frame_then_refuse_overwrite() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());

    framedeck(dir.path())
        .args(["export", "--manifest", &manifest, "--select", "frame-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 frames, 2 pages"));

    framedeck(dir.path())
        .args(["export", "--manifest", &manifest, "--select", "1"])
        .assert()
        .failure();

    framedeck(dir.path())
        .args(["export", "--manifest", &manifest, "--all", "--overwrite"])
        .assert()
        .success();
}

#[test]
fn test_export_rejects_bad_selection() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());

    framedeck(dir.path())
        .args(["export", "--manifest", &manifest, "--select", "first"])
        .assert()
        .failure();
    assert!(!dir.path().join("talk_frames.pdf").exists());
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());

    let output = framedeck(dir.path())
        .args(["inspect", "--manifest", &manifest, "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "frame-0");
    assert_eq!(entries[1]["timestamp"], 61.5);
    assert_eq!(entries[1]["format"], "png");
    assert_eq!(entries[1]["similarity"], 212.0);
}

#[test]
fn test_inspect_text() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());

    framedeck(dir.path())
        .args(["inspect", "--manifest", &manifest])
        .assert()
        .success()
        .stdout(predicate::str::contains("Source: /recordings/talk.mp4"))
        .stdout(predicate::str::contains("frame-1"));
}

#[test]
fn test_extract_missing_video_fails() {
    let dir = TempDir::new().unwrap();
    framedeck(dir.path())
        .args(["extract", "--input", "no-such-video.mp4", "--out-dir", "frames"])
        .assert()
        .failure();
    assert!(!dir.path().join("frames").join("manifest.json").exists());
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(dir.path());
    std::fs::write(dir.path().join("framedeck.toml"), "[encoding]\njpeg_quality = 0\n").unwrap();

    framedeck(dir.path())
        .args(["inspect", "--manifest", &manifest])
        .assert()
        .failure();
}
