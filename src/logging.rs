//! Log output setup for the command-line tool.
//!
//! The library only emits through the `log` facade. The binary calls
//! [`init_logging`] once, which formats every line as
//! `[HH:MM:SS.mmm] LEVEL message` and optionally appends to
//! `logs/squares_scan.log` next to the executable.

use std::fs::OpenOptions;
use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env, Target};

use crate::paths;

const LOG_FILE_NAME: &str = "squares_scan.log";

/// Installs the global logger. `RUST_LOG` overrides the default `info` level.
pub fn init_logging(to_file: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {:<5} {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if to_file {
        let log_path = paths::get_logs_dir().join(LOG_FILE_NAME);
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Failed to open {}: {}", log_path.display(), e),
        }
    }

    let _ = builder.try_init();
}
