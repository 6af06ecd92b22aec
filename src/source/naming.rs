//! Output artifact naming.

use crate::bundler::{Result, settings::ProductSettings};
use handlebars::Handlebars;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Extracts the version token from an installer file name.
///
/// Takes the text after the first `prefix` up to the first `suffix`.
/// Without `prefix` in the name, returns `fallback`.
pub fn extract_version(file_name: &str, prefix: &str, suffix: &str, fallback: &str) -> String {
    match file_name.split_once(prefix) {
        Some((_, rest)) => {
            let rest = rest.split(prefix).next().unwrap_or(rest);
            rest.split(suffix).next().unwrap_or(rest).to_string()
        }
        None => fallback.to_string(),
    }
}

/// Derives the bundle path from the application installer path.
///
/// The result sits next to the application installer and is named by
/// rendering [`ProductSettings::output_template`].
pub fn derive_output_path(app_installer: &Path, product: &ProductSettings) -> Result<PathBuf> {
    let file_name = app_installer
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let version = extract_version(
        &file_name,
        &product.version_prefix(),
        &product.version_suffix,
        &product.fallback_version,
    );

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    let mut data = BTreeMap::new();
    data.insert("product", product.name.as_str());
    data.insert("version", version.as_str());

    let name = handlebars.render_template(&product.output_template, &data)?;

    let dir = app_installer.parent().unwrap_or_else(|| Path::new(""));
    let output = dir.join(name);
    log::info!("Generated output path: {}", output.display());
    Ok(output)
}
