//! Installer bundler - combines an application installer with the Windows SDK installer.
//!
//! The same binary is the install-time sequencer: when it carries an embedded
//! payload it installs instead of bundling.

use installer_bundler::cli;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Some(code) = cli::run_embedded().await {
        process::exit(code);
    }

    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            let output = cli::OutputManager::new(false);
            output.error(&format!("Error: {}", e));
            for suggestion in e.recovery_suggestions() {
                eprintln!("  {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
