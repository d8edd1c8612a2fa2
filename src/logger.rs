//! Log output.
//! Lines look like `[*] 14:02:11 Playing 17 tones`, with `[E]`, `[W]`, `[*]`, `[D]` or `[T]`
//! marking the level.

use std::io::Write;

use env_logger::{Builder, Env};
use log::{Level, LevelFilter};

use crate::controls;

/// Sets up logging, `RUST_LOG` takes priority over `verbosity`.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format(|buf, record| {
            let end = if controls::raw_mode() { "\r\n" } else { "\n" };
            write!(
                buf,
                "[{}] {} {}{end}",
                prefix(record.level()),
                chrono::Local::now().format("%H:%M:%S"),
                record.args()
            )
        })
        .init();
}

fn prefix(level: Level) -> char {
    match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => '*',
        Level::Debug => 'D',
        Level::Trace => 'T',
    }
}
