//! A wrapper module to export logging functionality from
//! [`log`] or [`tracing`] depending on the `tracing` feature, and the
//! `env_logger` setup shared by both binaries.
//!
//! [`log`]: https://docs.rs/log
//! [`tracing`]: https://docs.rs/tracing

use std::io::Write;
use std::thread;

use env_logger::Builder;
use log::LevelFilter;

#[cfg(not(feature = "tracing"))]
pub use log::{debug, error, info, trace, warn};

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

/// Installs the global `env_logger` backend.
///
/// Lines look like `(consumer) INFO - kafka_demo::consumer - message`; the
/// thread prefix is only printed when `log_thread` is set. `rust_log` uses the
/// `RUST_LOG` syntax (for example `rdkafka=trace`) and replaces the default
/// `info` filter.
pub fn setup_logger(log_thread: bool, rust_log: Option<&str>) {
    let mut builder = Builder::new();
    builder
        .format(move |buf, record| {
            let thread_name = if log_thread {
                format!("({}) ", thread::current().name().unwrap_or("unknown"))
            } else {
                String::new()
            };
            writeln!(
                buf,
                "{}{} - {} - {}",
                thread_name,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info);

    if let Some(conf) = rust_log {
        builder.parse_filters(conf);
    }

    // A second initialization only happens in tests; keep the first logger.
    let _ = builder.try_init();
}
