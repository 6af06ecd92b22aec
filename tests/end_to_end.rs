use installer_bundler::{
    bundler::{ArchiveSettings, Bundler, SettingsBuilder, Strategy},
    sequencer::{BundleManifest, payload},
};
use std::{fs, path::Path};

const APP: &str = "SCRM Champion-4.85.1-win32-x64.exe";
const EXPECTED_OUTPUT: &str = "SCRM Champion-4.85.1-with-SDK-win32-x64.exe";

/// Two zero-byte installers and a stub executable.
fn placeholders(dir: &Path) {
    fs::write(dir.join(APP), b"").unwrap();
    fs::write(dir.join("winsdksetup.exe"), b"").unwrap();
    fs::write(dir.join("stub.exe"), b"MZ stub").unwrap();
}

/// Workspace directories left under `root`.
fn leftover_workspaces(root: &Path) -> Vec<String> {
    fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn settings(dir: &Path, strategy: Strategy) -> SettingsBuilder {
    SettingsBuilder::new()
        .search_dirs(vec![dir.to_path_buf()])
        .stub(dir.join("stub.exe"))
        .strategy(strategy)
}

#[tokio::test]
async fn script_bundle_from_discovered_installers() {
    let dir = tempfile::tempdir().unwrap();
    placeholders(dir.path());

    let settings = settings(dir.path(), Strategy::Script).build().unwrap();
    let artifact = Bundler::new(settings).bundle().await.unwrap();

    assert_eq!(artifact.strategy, Strategy::Script);
    assert_eq!(artifact.path.file_name().unwrap(), EXPECTED_OUTPUT);
    assert_eq!(artifact.path.parent().unwrap(), dir.path());
    assert_eq!(fs::metadata(&artifact.path).unwrap().len(), artifact.size);
    assert!(fs::read(&artifact.path).unwrap().starts_with(b"MZ stub"));

    let location = payload::locate(&artifact.path).unwrap().expect("payload");
    let unpacked = tempfile::tempdir().unwrap();
    payload::unpack(&artifact.path, location, unpacked.path())
        .await
        .unwrap();

    let manifest = BundleManifest::read_from(unpacked.path()).await.unwrap();
    assert_eq!(manifest.first.file_name, "SCRM_Champion.exe");
    assert_eq!(manifest.second.file_name, "winsdksetup.exe");
    assert_eq!(manifest.second.args, ["/quiet", "/norestart"]);
    assert!(unpacked.path().join("SCRM_Champion.exe").is_file());
    assert!(unpacked.path().join("winsdksetup.exe").is_file());
}

#[tokio::test]
async fn rebundling_replaces_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    placeholders(dir.path());
    let output = dir.path().join("combined.exe");

    for _ in 0..2 {
        let settings = settings(dir.path(), Strategy::Script)
            .output(&output)
            .build()
            .unwrap();
        Bundler::new(settings).bundle().await.unwrap();
    }

    let location = payload::locate(&output).unwrap().expect("payload");
    assert_eq!(location.offset, b"MZ stub".len() as u64);
}

#[tokio::test]
async fn archive_without_archiver_falls_back_to_script() {
    let dir = tempfile::tempdir().unwrap();
    placeholders(dir.path());

    let settings = settings(dir.path(), Strategy::Archive)
        .archive(ArchiveSettings {
            archiver: "no-such-archiver-7z".into(),
            ..Default::default()
        })
        .build()
        .unwrap();
    let artifact = Bundler::new(settings).bundle().await.unwrap();

    assert_eq!(artifact.strategy, Strategy::Script);
    assert_eq!(artifact.path.file_name().unwrap(), EXPECTED_OUTPUT);
    assert!(payload::locate(&artifact.path).unwrap().is_some());
}

#[tokio::test]
async fn nsis_without_compiler_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    placeholders(dir.path());

    let mut nsis = installer_bundler::bundler::NsisSettings::default();
    nsis.compiler = "no-such-makensis".into();
    let settings = settings(dir.path(), Strategy::Nsis)
        .nsis(nsis)
        .build()
        .unwrap();

    let err = Bundler::new(settings).bundle().await.unwrap_err();
    assert!(err.is_tool_failure());
    assert!(!dir.path().join(EXPECTED_OUTPUT).exists());
}

#[tokio::test]
async fn successful_bundle_removes_its_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let temp_root = tempfile::tempdir().unwrap();
    placeholders(dir.path());

    let settings = settings(dir.path(), Strategy::Script)
        .temp_root(temp_root.path())
        .build()
        .unwrap();
    Bundler::new(settings).bundle().await.unwrap();

    assert!(dir.path().join(EXPECTED_OUTPUT).is_file());
    assert!(leftover_workspaces(temp_root.path()).is_empty());
}

#[cfg(unix)]
mod failing_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn failing_tool(dir: &Path, name: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 2\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn failed_nsis_compile_removes_its_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let temp_root = tempfile::tempdir().unwrap();
        placeholders(dir.path());

        let mut nsis = installer_bundler::bundler::NsisSettings::default();
        nsis.compiler = failing_tool(dir.path(), "makensis");
        let settings = settings(dir.path(), Strategy::Nsis)
            .nsis(nsis)
            .temp_root(temp_root.path())
            .build()
            .unwrap();

        let err = Bundler::new(settings).bundle().await.unwrap_err();
        assert!(err.is_tool_failure());
        assert!(leftover_workspaces(temp_root.path()).is_empty());
    }

    #[tokio::test]
    async fn failed_archiver_falls_back_and_removes_workspaces() {
        let dir = tempfile::tempdir().unwrap();
        let temp_root = tempfile::tempdir().unwrap();
        placeholders(dir.path());
        fs::write(dir.path().join("7zS.sfx"), b"SFXMODULE").unwrap();

        let settings = settings(dir.path(), Strategy::Archive)
            .archive(ArchiveSettings {
                archiver: failing_tool(dir.path(), "7z"),
                ..Default::default()
            })
            .temp_root(temp_root.path())
            .build()
            .unwrap();
        let artifact = Bundler::new(settings).bundle().await.unwrap();

        assert_eq!(artifact.strategy, Strategy::Script);
        assert!(payload::locate(&artifact.path).unwrap().is_some());
        assert!(leftover_workspaces(temp_root.path()).is_empty());
    }
}
