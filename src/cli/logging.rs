//! Logger initialisation.
//!
//! Logs go to stderr through `env_logger` (filter `info`, overridable with
//! `RUST_LOG`). When a log file is given every line is also appended to it.

use crate::bundler::ProductSettings;
use env_logger::{Builder, Env, Target};
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

/// Writes every line to stderr and to a file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Log file used by install-time runs of `product` when none is given.
pub fn install_log_path(product: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "{}_installer.log",
        ProductSettings::named(product).slug()
    ))
}

/// Initialises the global logger. Safe to call more than once.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {} - {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                )
            })
            .target(Target::Pipe(Box::new(Tee { file })));
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
    Ok(())
}
