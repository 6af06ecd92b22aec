use assert_cmd::Command;
use predicates::prelude::*;

fn bundler() -> Command {
    Command::cargo_bin("installer_bundler").expect("binary exists")
}

#[test]
fn help_lists_bundling_flags() {
    bundler()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--app-installer"))
        .stdout(predicate::str::contains("--sdk-installer"))
        .stdout(predicate::str::contains("--strategy"))
        .stdout(predicate::str::contains("--nsis"))
        .stdout(predicate::str::contains("--sequence-dir"));
}

#[test]
fn nsis_and_strategy_conflict() {
    bundler()
        .args(["--nsis", "--strategy", "archive"])
        .assert()
        .failure();
}

#[test]
fn missing_installers_fail_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    bundler()
        .current_dir(dir.path())
        .env("RUST_LOG", "off")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("--app-installer"));
}

#[test]
fn sequence_dir_without_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    bundler()
        .arg("--sequence-dir")
        .arg(dir.path())
        .arg("--log-file")
        .arg(dir.path().join("install.log"))
        .assert()
        .code(1);
}

#[test]
fn sequence_dir_rejects_bundling_flags() {
    let dir = tempfile::tempdir().unwrap();
    bundler()
        .arg("--sequence-dir")
        .arg(dir.path())
        .arg("--nsis")
        .arg("--log-file")
        .arg(dir.path().join("install.log"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Conflicting arguments"));
}

#[cfg(unix)]
mod sequencing {
    use super::*;
    use std::{fs, os::unix::fs::PermissionsExt, path::Path};

    fn script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn stage(dir: &Path, first_exit: i32, marker: &Path) {
        script(dir, "SCRM_Champion.exe", &format!("exit {}", first_exit));
        script(
            dir,
            "winsdksetup.exe",
            &format!("echo \"$@\" > '{}'", marker.display()),
        );
        fs::write(
            dir.join("bundle.json"),
            r#"{
                "product": "SCRM Champion",
                "first": { "file_name": "SCRM_Champion.exe" },
                "second": { "file_name": "winsdksetup.exe", "args": ["/quiet", "/norestart"] }
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn sdk_runs_after_successful_app_install() {
        let staged = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let marker = out.path().join("sdk-ran");
        stage(staged.path(), 0, &marker);

        bundler()
            .arg("--sequence-dir")
            .arg(staged.path())
            .arg("--log-file")
            .arg(out.path().join("install.log"))
            .assert()
            .success();

        let args = fs::read_to_string(&marker).unwrap();
        assert_eq!(args.trim(), "/quiet /norestart");
        let log = fs::read_to_string(out.path().join("install.log")).unwrap();
        assert!(!log.is_empty());
    }

    #[test]
    fn sdk_is_skipped_after_failed_app_install() {
        let staged = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let marker = out.path().join("sdk-ran");
        stage(staged.path(), 3, &marker);

        bundler()
            .arg("--sequence-dir")
            .arg(staged.path())
            .arg("--log-file")
            .arg(out.path().join("install.log"))
            .assert()
            .code(1);

        assert!(!marker.exists());
    }

    #[test]
    fn install_log_is_named_after_bundled_product() {
        let staged = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let marker = out.path().join("sdk-ran");
        stage(staged.path(), 0, &marker);
        fs::write(
            staged.path().join("bundle.json"),
            r#"{
                "product": "Cli Smoke Log Product",
                "first": { "file_name": "SCRM_Champion.exe" },
                "second": { "file_name": "winsdksetup.exe", "args": ["/quiet"] }
            }"#,
        )
        .unwrap();
        let log = std::env::temp_dir().join("cli_smoke_log_product_installer.log");
        let _ = fs::remove_file(&log);

        bundler()
            .env_remove("RUST_LOG")
            .arg("--sequence-dir")
            .arg(staged.path())
            .assert()
            .success();

        let contents = fs::read_to_string(&log).unwrap();
        let _ = fs::remove_file(&log);
        assert!(contents.contains("Cli Smoke Log Product installation completed"));
    }
}
