//! NSIS installer script generation.
//!
//! Renders the wrapper and direct templates with Handlebars and writes them
//! with the UTF-8 BOM NSIS requires.

use super::{
    template::{DIRECT_TEMPLATE, WRAPPER_TEMPLATE},
    utils,
};
use crate::bundler::{
    error::Result,
    settings::{ExecutionLevel, Settings},
};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Files fed into a wrapper installer.
#[derive(Debug)]
pub struct WrapperInputs<'a> {
    /// Staged application installer.
    pub app: &'a Path,
    /// Staged SDK installer.
    pub sdk: &'a Path,
    /// Installer to produce.
    pub output: &'a Path,
}

/// Files fed into a direct installer.
#[derive(Debug)]
pub struct DirectInputs<'a> {
    /// Directory holding the extracted application files.
    pub app_dir: &'a Path,
    /// Staged SDK installer.
    pub sdk: &'a Path,
    /// Installer to produce.
    pub output: &'a Path,
}

#[derive(Serialize)]
struct WrapperData {
    product: String,
    output: String,
    install_dir: String,
    unique_install_dir: bool,
    execution_level: &'static str,
    compression: &'static str,
    silent: bool,
    app_source: String,
    sdk_source: String,
    app_installed: String,
    sdk_installed: String,
    sdk_args: String,
}

#[derive(Serialize)]
struct DirectData {
    product: String,
    output: String,
    install_dir: String,
    execution_level: &'static str,
    compression: &'static str,
    app_files: String,
    sdk_source: String,
    sdk_installed: String,
    sdk_args: String,
    app_executable: String,
    start_menu_dir: String,
    start_menu_link: String,
    desktop_link: String,
    uninstaller: String,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    Ok(handlebars.render_template(template, data)?)
}

/// Renders the wrapper installer script.
pub fn render_wrapper(settings: &Settings, inputs: &WrapperInputs<'_>) -> Result<String> {
    let product = &settings.product().name;
    let nsis = settings.nsis();

    let (install_dir, unique_install_dir) = match &nsis.install_dir {
        Some(dir) => (dir.clone(), false),
        None => (format!("$TEMP\\{}_Installer", product.replace(' ', "_")), true),
    };

    let data = WrapperData {
        product: product.clone(),
        output: inputs.output.display().to_string(),
        install_dir,
        unique_install_dir,
        execution_level: utils::map_execution_level(nsis.execution_level),
        compression: utils::map_compression(nsis.compression),
        silent: nsis.silent_install,
        app_source: inputs.app.display().to_string(),
        sdk_source: inputs.sdk.display().to_string(),
        app_installed: utils::in_instdir(&file_name(inputs.app)),
        sdk_installed: utils::in_instdir(&file_name(inputs.sdk)),
        sdk_args: utils::command_tail(&settings.sdk().launch_args()),
    };

    render(WRAPPER_TEMPLATE, &data)
}

/// Renders the direct (repackaged) installer script.
pub fn render_direct(settings: &Settings, inputs: &DirectInputs<'_>) -> Result<String> {
    let product = &settings.product().name;
    let nsis = settings.nsis();

    let install_dir = nsis
        .install_dir
        .clone()
        .unwrap_or_else(|| format!("$PROGRAMFILES64\\{}", product));
    let start_menu_dir = format!("$SMPROGRAMS\\{}", product);

    let data = DirectData {
        product: product.clone(),
        output: inputs.output.display().to_string(),
        install_dir,
        execution_level: utils::map_execution_level(ExecutionLevel::Admin),
        compression: utils::map_compression(nsis.compression),
        app_files: format!("{}{}*.*", inputs.app_dir.display(), MAIN_SEPARATOR),
        sdk_source: inputs.sdk.display().to_string(),
        sdk_installed: utils::in_instdir(&file_name(inputs.sdk)),
        sdk_args: utils::command_tail(&settings.sdk().launch_args()),
        app_executable: utils::in_instdir(&settings.product().app_executable()),
        start_menu_link: format!("{}\\{}.lnk", start_menu_dir, product),
        start_menu_dir,
        desktop_link: format!("$DESKTOP\\{}.lnk", product),
        uninstaller: utils::in_instdir(&format!("Uninstall {}.exe", product)),
    };

    render(DIRECT_TEMPLATE, &data)
}

/// Writes `content` as `<dir>/<name>` with a UTF-8 BOM.
pub async fn write_script(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let nsi_path = dir.join(name);
    utils::write_utf8_bom(&nsi_path, content).await?;
    Ok(nsi_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{NsisSettings, SdkSettings, SettingsBuilder};

    fn settings() -> Settings {
        SettingsBuilder::new().search_dirs(vec![]).build().unwrap()
    }

    fn wrapper(settings: &Settings) -> String {
        render_wrapper(
            settings,
            &WrapperInputs {
                app: Path::new("/ws/SCRM_Champion.exe"),
                sdk: Path::new("/ws/winsdksetup.exe"),
                output: Path::new("/out/Bundle.exe"),
            },
        )
        .unwrap()
    }

    #[test]
    fn second_installer_is_gated_on_first_exit_code() {
        let script = wrapper(&settings());
        let first = script
            .find("ExecWait '\"$INSTDIR\\SCRM_Champion.exe\"' $0")
            .expect("first installer launched");
        let gate = script.find("${If} $0 == 0").expect("gate present");
        let second = script
            .find("ExecWait '\"$INSTDIR\\winsdksetup.exe\" /quiet /norestart' $1")
            .expect("second installer launched silently");
        assert!(first < gate && gate < second);
        assert!(script.contains("SetErrorLevel $1"));
    }

    #[test]
    fn wrapper_declares_output_level_and_silence() {
        let script = wrapper(&settings());
        assert!(script.contains("OutFile \"/out/Bundle.exe\""));
        assert!(script.contains("RequestExecutionLevel user"));
        assert!(script.contains("SilentInstall silent"));
        assert!(script.contains("InstallDir \"$TEMP\\SCRM_Champion_Installer\""));
        assert!(script.contains("Function .onInit"));
        assert!(script.contains("Section \"Uninstall\""));
        assert!(script.contains("SetCompressor /SOLID lzma"));
    }

    #[test]
    fn install_dir_override_disables_unique_suffix() {
        let settings = SettingsBuilder::new()
            .search_dirs(vec![])
            .nsis(NsisSettings {
                install_dir: Some("C:\\Bundles".into()),
                silent_install: false,
                ..Default::default()
            })
            .build()
            .unwrap();
        let script = wrapper(&settings);
        assert!(script.contains("InstallDir \"C:\\Bundles\""));
        assert!(!script.contains(".onInit"));
        assert!(!script.contains("SilentInstall"));
    }

    #[test]
    fn interactive_sdk_drops_silent_flags() {
        let settings = SettingsBuilder::new()
            .search_dirs(vec![])
            .sdk(SdkSettings {
                silent: false,
                ..Default::default()
            })
            .build()
            .unwrap();
        let script = wrapper(&settings);
        assert!(script.contains("ExecWait '\"$INSTDIR\\winsdksetup.exe\"' $1"));
        assert!(!script.contains("/quiet"));
    }

    #[test]
    fn direct_installer_has_shortcuts_and_uninstaller() {
        let script = render_direct(
            &settings(),
            &DirectInputs {
                app_dir: Path::new("/ws/app"),
                sdk: Path::new("/ws/winsdksetup.exe"),
                output: Path::new("/out/Bundle.exe"),
            },
        )
        .unwrap();

        assert!(script.contains("!include \"MUI2.nsh\""));
        assert!(script.contains("RequestExecutionLevel admin"));
        assert!(script.contains("InstallDir \"$PROGRAMFILES64\\SCRM Champion\""));
        assert!(script.contains(&format!("File /r \"/ws/app{}*.*\"", MAIN_SEPARATOR)));
        assert!(script.contains(
            "CreateShortcut \"$DESKTOP\\SCRM Champion.lnk\" \"$INSTDIR\\SCRM Champion.exe\""
        ));
        assert!(script.contains("WriteUninstaller \"$INSTDIR\\Uninstall SCRM Champion.exe\""));
        assert!(script.contains("RMDir /r \"$INSTDIR\""));
    }
}
