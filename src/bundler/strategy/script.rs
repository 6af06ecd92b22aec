//! Self-running artifact: stub executable plus embedded payload.
//!
//! When run, the artifact finds its payload, unpacks the installers into a
//! fresh workspace and sequences them.

use super::{BundleInputs, resolve_stub, stage_bundle};
use crate::{
    bundler::{
        Result,
        settings::Settings,
        utils::fs,
        workspace::{BUNDLE_PREFIX, Workspace},
    },
    sequencer::payload,
};

/// Payload archive name inside the workspace.
const PAYLOAD_ARCHIVE: &str = "payload.tar.gz";

/// Builds the self-running artifact at `inputs.output`.
pub async fn bundle(settings: &Settings, inputs: &BundleInputs) -> Result<()> {
    let stub = resolve_stub(settings)?;
    log::info!("Creating self-running installer on stub {}", stub.display());

    let workspace = Workspace::create_in(settings.temp_root(), BUNDLE_PREFIX).await?;
    let result: Result<()> = async {
        let stage_dir = stage_bundle(workspace.path(), settings, inputs).await?;

        let archive = workspace.join(PAYLOAD_ARCHIVE);
        payload::pack_dir(&stage_dir, &archive).await?;

        let size = payload::write_artifact(&stub, &archive, &inputs.output).await?;
        fs::set_executable(&inputs.output).await?;
        log::info!("Wrote {} ({} bytes)", inputs.output.display(), size);
        Ok(())
    }
    .await;

    workspace.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bundler::{SdkSettings, SettingsBuilder},
        sequencer::BundleManifest,
    };

    #[tokio::test]
    async fn artifact_starts_with_stub_and_carries_bundle() {
        let root = tempfile::tempdir().unwrap();
        let app = root.path().join("SCRM Champion-2.0-win32-x64.exe");
        let sdk = root.path().join("winsdksetup.exe");
        let stub = root.path().join("stub.exe");
        std::fs::write(&app, b"app bytes").unwrap();
        std::fs::write(&sdk, b"sdk bytes").unwrap();
        std::fs::write(&stub, b"MZ-stub").unwrap();

        let settings = SettingsBuilder::new()
            .search_dirs(vec![])
            .stub(&stub)
            .build()
            .unwrap();
        let inputs = BundleInputs {
            app,
            sdk,
            output: root.path().join("out/bundle.exe"),
        };

        bundle(&settings, &inputs).await.unwrap();

        let bytes = std::fs::read(&inputs.output).unwrap();
        assert!(bytes.starts_with(b"MZ-stub"));

        let location = payload::locate(&inputs.output).unwrap().unwrap();
        let dest = root.path().join("unpacked");
        std::fs::create_dir(&dest).unwrap();
        payload::unpack(&inputs.output, location, &dest).await.unwrap();

        let manifest = BundleManifest::read_from(&dest).await.unwrap();
        assert_eq!(
            std::fs::read(dest.join(&manifest.first.file_name)).unwrap(),
            b"app bytes"
        );
        assert_eq!(
            std::fs::read(dest.join(&manifest.second.file_name)).unwrap(),
            b"sdk bytes"
        );
    }

    #[tokio::test]
    async fn sdk_is_launched_silently_even_when_interactive() {
        let root = tempfile::tempdir().unwrap();
        let app = root.path().join("SCRM Champion-2.0-win32-x64.exe");
        let sdk = root.path().join("winsdksetup.exe");
        let stub = root.path().join("stub.exe");
        for path in [&app, &sdk, &stub] {
            std::fs::write(path, b"x").unwrap();
        }

        let settings = SettingsBuilder::new()
            .sdk(SdkSettings {
                silent: false,
                ..Default::default()
            })
            .search_dirs(vec![])
            .stub(&stub)
            .temp_root(root.path())
            .build()
            .unwrap();
        let inputs = BundleInputs {
            app,
            sdk,
            output: root.path().join("bundle.exe"),
        };

        bundle(&settings, &inputs).await.unwrap();

        let location = payload::locate(&inputs.output).unwrap().unwrap();
        let dest = root.path().join("unpacked");
        std::fs::create_dir(&dest).unwrap();
        payload::unpack(&inputs.output, location, &dest).await.unwrap();
        let manifest = BundleManifest::read_from(&dest).await.unwrap();
        assert_eq!(manifest.second.args, ["/quiet", "/norestart"]);
    }

    #[tokio::test]
    async fn missing_stub_is_missing_input() {
        let root = tempfile::tempdir().unwrap();
        let settings = SettingsBuilder::new()
            .search_dirs(vec![])
            .stub(root.path().join("nope.exe"))
            .build()
            .unwrap();
        let inputs = BundleInputs {
            app: root.path().join("a.exe"),
            sdk: root.path().join("b.exe"),
            output: root.path().join("out.exe"),
        };

        let err = bundle(&settings, &inputs).await.unwrap_err();
        assert!(matches!(err, crate::bundler::Error::MissingInput { .. }));
    }
}
