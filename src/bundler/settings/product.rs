//! Product naming and installer discovery settings.

use serde::Deserialize;

/// Product metadata and the naming rules tied to it.
///
/// Describes how the application installer and the SDK installer are
/// recognised on disk, what they are called once staged, and how the
/// output artifact is named.
///
/// # Configuration
///
/// ```toml
/// [product]
/// name = "SCRM Champion"
/// app_pattern = "*SCRM*Champion*.exe"
/// sdk_pattern = "*winsdksetup*.exe"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductSettings {
    /// Product name displayed to users and used in derived file names.
    pub name: String,

    /// Glob matched against file names to find the application installer.
    pub app_pattern: String,

    /// Glob matched against file names to find the SDK installer.
    pub sdk_pattern: String,

    /// File name the application installer gets inside a bundle.
    pub app_staged_name: String,

    /// File name the SDK installer gets inside a bundle.
    pub sdk_staged_name: String,

    /// Text preceding the version token in the application installer name.
    ///
    /// Default: None (uses `"<name>-"`)
    pub version_prefix: Option<String>,

    /// Text following the version token in the application installer name.
    pub version_suffix: String,

    /// Version used when the application installer name carries none.
    pub fallback_version: String,

    /// Handlebars template for the output file name.
    ///
    /// Receives `product` and `version`.
    pub output_template: String,

    /// Main executable inside the application installer (repackage shortcuts).
    ///
    /// Default: None (uses `"<name>.exe"`)
    pub app_executable: Option<String>,
}

impl Default for ProductSettings {
    fn default() -> Self {
        Self {
            name: "SCRM Champion".into(),
            app_pattern: "*SCRM*Champion*.exe".into(),
            sdk_pattern: "*winsdksetup*.exe".into(),
            app_staged_name: "SCRM_Champion.exe".into(),
            sdk_staged_name: "winsdksetup.exe".into(),
            version_prefix: None,
            version_suffix: "-win".into(),
            fallback_version: "latest".into(),
            output_template: "{{product}}-{{version}}-with-SDK-win32-x64.exe".into(),
            app_executable: None,
        }
    }
}

impl ProductSettings {
    /// Settings for a product, keeping every other default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Text preceding the version token.
    pub fn version_prefix(&self) -> String {
        self.version_prefix
            .clone()
            .unwrap_or_else(|| format!("{}-", self.name))
    }

    /// Main executable of the installed application.
    pub fn app_executable(&self) -> String {
        self.app_executable
            .clone()
            .unwrap_or_else(|| format!("{}.exe", self.name))
    }

    /// File-system friendly form of the product name (`SCRM Champion` -> `scrm_champion`).
    pub fn slug(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// How the SDK installer is launched once the application installer succeeded.
///
/// ```toml
/// [sdk]
/// silent = true
/// silent_args = ["/quiet", "/norestart"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdkSettings {
    /// Append `silent_args` when an NSIS installer launches the SDK installer.
    ///
    /// Self-running and archive bundles always launch it silently.
    pub silent: bool,

    /// Arguments that make the SDK installer unattended.
    pub silent_args: Vec<String>,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            silent: true,
            silent_args: vec!["/quiet".into(), "/norestart".into()],
        }
    }
}

impl SdkSettings {
    /// Arguments for the SDK installer launch from an NSIS installer.
    pub fn launch_args(&self) -> Vec<String> {
        if self.silent {
            self.silent_args.clone()
        } else {
            Vec::new()
        }
    }
}
