//! 7-Zip self-extracting archive.
//!
//! The archive holds the staged bundle, a copy of the stub without any
//! payload it carries, and a run script.
//! The SFX module extracts it to a temp directory and runs the script, which
//! starts the stub over the extracted directory.

use super::{BundleInputs, resolve_stub, stage_bundle};
use crate::{
    bundler::{
        Result,
        builder::tool_detection::{find_tool, run_tool},
        error::{Error, ErrorExt},
        settings::Settings,
        utils::fs::{self, Part},
        workspace::{BUNDLE_PREFIX, Workspace},
    },
    sequencer::payload,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Stub copy placed in the archive.
pub const SEQUENCER_EXE: &str = "bundle-sequencer.exe";

/// Script started by the SFX module after extraction.
pub const RUN_SCRIPT: &str = "run_installer.bat";

/// `%~dp0` ends in a backslash, which would escape the closing quote; `.` keeps it a directory.
const RUN_SCRIPT_BODY: &str =
    "@echo off\r\n\"%~dp0bundle-sequencer.exe\" --sequence-dir \"%~dp0.\"\r\nexit /b %ERRORLEVEL%\r\n";

const SFX_CONFIG_TEMPLATE: &str = r#";!@Install@!UTF-8!
Title="{{title}}"
BeginPrompt="{{begin_prompt}}"
RunProgram="{{run_program}}"
;!@InstallEnd@!
"#;

const ARCHIVE_NAME: &str = "installer.7z";

#[derive(Serialize)]
struct SfxConfig {
    title: String,
    begin_prompt: String,
    run_program: &'static str,
}

/// Builds the SFX archive at `inputs.output`.
///
/// Tool problems surface as errors for which [`Error::is_tool_failure`] holds,
/// so the caller can fall back to the script strategy.
pub async fn bundle(settings: &Settings, inputs: &BundleInputs) -> Result<()> {
    let archive_settings = settings.archive();
    let archiver = find_tool(
        &archive_settings.archiver,
        "install 7-Zip and make sure 7z is on PATH, or set [archive] archiver",
    )?;
    let sfx_module = locate_sfx_module(settings, &archiver)?;
    log::info!("Using SFX module {}", sfx_module.display());

    let stub = resolve_stub(settings)?;
    let config = render_sfx_config(settings)?;

    let workspace = Workspace::create_in(settings.temp_root(), BUNDLE_PREFIX).await?;
    let result: Result<()> = async {
        let stage_dir = stage_bundle(workspace.path(), settings, inputs).await?;
        let sequencer = stage_dir.join(SEQUENCER_EXE);
        let stub_bytes = payload::stub_len(&stub)?;
        fs::concat(&sequencer, &[Part::FilePrefix(&stub, stub_bytes)]).await?;
        fs::set_executable(&sequencer).await?;
        let script = stage_dir.join(RUN_SCRIPT);
        tokio::fs::write(&script, RUN_SCRIPT_BODY)
            .await
            .fs_context("writing run script", &script)?;

        let archive = workspace.join(ARCHIVE_NAME);
        log::info!("Creating 7z archive...");
        let sources = stage_dir.join("*");
        run_tool(
            &archiver,
            [
                OsStr::new("a"),
                OsStr::new("-y"),
                archive.as_os_str(),
                sources.as_os_str(),
            ],
        )
        .await?;

        log::info!("Creating self-extracting archive...");
        let size = fs::concat(
            &inputs.output,
            &[
                Part::File(&sfx_module),
                Part::Bytes(config.as_bytes()),
                Part::File(&archive),
            ],
        )
        .await?;
        log::info!("Wrote {} ({} bytes)", inputs.output.display(), size);
        Ok(())
    }
    .await;

    workspace.close().await;
    result
}

/// Finds the SFX module: as given when absolute, else in the search
/// directories, else next to the archiver.
fn locate_sfx_module(settings: &Settings, archiver: &Path) -> Result<PathBuf> {
    let module = &settings.archive().sfx_module;
    let candidates: Vec<PathBuf> = if module.is_absolute() {
        vec![module.clone()]
    } else {
        settings
            .search_dirs()
            .iter()
            .map(|dir| dir.join(module))
            .chain(archiver.parent().map(|dir| dir.join(module)))
            .collect()
    };

    candidates
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::ToolNotFound {
            tool: module.display().to_string(),
            hint: "place the 7-Zip SFX module next to 7z or set [archive] sfx_module".into(),
        })
}

/// Renders the `;!@Install@!UTF-8!` configuration block.
fn render_sfx_config(settings: &Settings) -> Result<String> {
    let product = &settings.product().name;
    let archive = settings.archive();
    let config = SfxConfig {
        title: quote(
            archive
                .title
                .clone()
                .unwrap_or_else(|| format!("{} with Windows SDK Installer", product)),
        ),
        begin_prompt: quote(
            archive
                .begin_prompt
                .clone()
                .unwrap_or_else(|| format!("Do you want to install {} with Windows SDK?", product)),
        ),
        run_program: RUN_SCRIPT,
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    Ok(handlebars.render_template(SFX_CONFIG_TEMPLATE, &config)?)
}

fn quote(value: String) -> String {
    value.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{ArchiveSettings, SettingsBuilder};

    fn settings_with(archive: ArchiveSettings, dirs: Vec<PathBuf>) -> Settings {
        SettingsBuilder::new()
            .archive(archive)
            .search_dirs(dirs)
            .build()
            .unwrap()
    }

    #[test]
    fn config_block_names_run_script() {
        let settings = settings_with(ArchiveSettings::default(), vec![]);
        let config = render_sfx_config(&settings).unwrap();
        assert!(config.starts_with(";!@Install@!UTF-8!\n"));
        assert!(config.contains("Title=\"SCRM Champion with Windows SDK Installer\""));
        assert!(config.contains("RunProgram=\"run_installer.bat\""));
        assert!(config.trim_end().ends_with(";!@InstallEnd@!"));
    }

    #[test]
    fn config_quotes_are_escaped() {
        let settings = settings_with(
            ArchiveSettings {
                title: Some(r#"The "Best" App"#.into()),
                ..Default::default()
            },
            vec![],
        );
        let config = render_sfx_config(&settings).unwrap();
        assert!(config.contains(r#"Title="The \"Best\" App""#));
    }

    #[test]
    fn run_script_targets_sequencer() {
        assert!(RUN_SCRIPT_BODY.contains(SEQUENCER_EXE));
        assert!(RUN_SCRIPT_BODY.contains("--sequence-dir \"%~dp0.\""));
    }

    #[test]
    fn missing_sfx_module_is_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_with(ArchiveSettings::default(), vec![dir.path().to_path_buf()]);
        let err = locate_sfx_module(&settings, &dir.path().join("7z")).unwrap_err();
        assert!(err.is_tool_failure());
    }

    #[test]
    fn sfx_module_found_next_to_archiver() {
        let search = tempfile::tempdir().unwrap();
        let tools = tempfile::tempdir().unwrap();
        let module = tools.path().join("7zS.sfx");
        std::fs::write(&module, b"sfx").unwrap();

        let settings = settings_with(ArchiveSettings::default(), vec![search.path().to_path_buf()]);
        let found = locate_sfx_module(&settings, &tools.path().join("7z")).unwrap();
        assert_eq!(found, module);
    }

    #[tokio::test]
    async fn missing_archiver_is_tool_failure() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_with(
            ArchiveSettings {
                archiver: "definitely-not-7z".into(),
                ..Default::default()
            },
            vec![],
        );
        let inputs = BundleInputs {
            app: root.path().join("a.exe"),
            sdk: root.path().join("b.exe"),
            output: root.path().join("out.exe"),
        };
        let err = bundle(&settings, &inputs).await.unwrap_err();
        assert!(err.is_tool_failure());
        assert!(!inputs.output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_is_module_config_then_archive() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let fake = root.path().join("fake7z");
        std::fs::write(&fake, "#!/bin/sh\nprintf 7zARCHIVE > \"$3\"\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(root.path().join("7zS.sfx"), b"SFXMODULE").unwrap();

        let app = root.path().join("app.exe");
        let sdk = root.path().join("sdk.exe");
        let stub = root.path().join("stub.exe");
        for path in [&app, &sdk, &stub] {
            std::fs::write(path, b"x").unwrap();
        }

        let settings = SettingsBuilder::new()
            .archive(ArchiveSettings {
                archiver: fake.display().to_string(),
                ..Default::default()
            })
            .search_dirs(vec![])
            .stub(&stub)
            .build()
            .unwrap();
        let inputs = BundleInputs {
            app,
            sdk,
            output: root.path().join("bundle.exe"),
        };

        bundle(&settings, &inputs).await.unwrap();

        let bytes = String::from_utf8(std::fs::read(&inputs.output).unwrap()).unwrap();
        assert!(bytes.starts_with("SFXMODULE;!@Install@!UTF-8!"));
        assert!(bytes.ends_with(";!@InstallEnd@!\n7zARCHIVE"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn staged_sequencer_drops_stub_payload() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let captured = root.path().join("captured-sequencer.exe");
        let fake = root.path().join("fake7z");
        std::fs::write(
            &fake,
            format!(
                "#!/bin/sh\nprintf 7zARCHIVE > \"$3\"\ncp \"$(dirname \"$4\")/{}\" '{}'\n",
                SEQUENCER_EXE,
                captured.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(root.path().join("7zS.sfx"), b"SFXMODULE").unwrap();

        // A stub that is itself a finished artifact.
        let plain_stub = root.path().join("plain.exe");
        std::fs::write(&plain_stub, b"MZ-stub").unwrap();
        let old_bundle = root.path().join("old");
        std::fs::create_dir(&old_bundle).unwrap();
        std::fs::write(old_bundle.join("bundle.json"), b"{}").unwrap();
        let old_archive = root.path().join("old.tar.gz");
        payload::pack_dir(&old_bundle, &old_archive).await.unwrap();
        let stub = root.path().join("previous-artifact.exe");
        payload::write_artifact(&plain_stub, &old_archive, &stub)
            .await
            .unwrap();
        assert!(payload::locate(&stub).unwrap().is_some());

        let app = root.path().join("app.exe");
        let sdk = root.path().join("sdk.exe");
        for path in [&app, &sdk] {
            std::fs::write(path, b"x").unwrap();
        }
        let settings = SettingsBuilder::new()
            .archive(ArchiveSettings {
                archiver: fake.display().to_string(),
                ..Default::default()
            })
            .search_dirs(vec![])
            .stub(&stub)
            .build()
            .unwrap();
        let inputs = BundleInputs {
            app,
            sdk,
            output: root.path().join("bundle.exe"),
        };

        bundle(&settings, &inputs).await.unwrap();

        assert_eq!(std::fs::read(&captured).unwrap(), b"MZ-stub");
        assert!(payload::locate(&captured).unwrap().is_none());
    }
}
