//! Structured JSON logging with a process-wide facade.
//!
//! A [`Logger`] writes one JSON object per line through a shared,
//! runtime-adjustable [`AtomicLevel`]. Callers should depend on the [`Log`]
//! trait; the free functions re-exported from [`global`] delegate to a
//! process-wide instance for code that cannot hold a handle.
//!
//! ```no_run
//! use logkit::{kv, Log, Logger};
//!
//! let logger = Logger::from_env_args().named("ingest");
//! logger.infow("batch stored", &kv!["rows" => 512]);
//! logger.debugf(format_args!("took {}ms", 14));
//! ```

pub mod api;
pub mod atomic_level;
pub mod bridge;
pub mod cli;
pub mod encoder;
pub mod error;
pub mod field;
pub mod global;
pub mod level;
pub mod logger;
pub mod sink;

// Only the binary reads its configuration from the environment.
pub mod config;

pub use atomic_level::AtomicLevel;
pub use error::{LogError, ParseLevelError};
pub use field::Field;
pub use global::{
    debug, debugf, debugw, dpanic, dpanicf, dpanicw, error, errorf, errorw, fatal, fatalf, fatalw,
    info, infof, infow, init, level_handler, named, panic, panicf, panicw, sync, warn, warnf,
    warnw, with,
};
pub use level::Level;
pub use logger::{FatalHook, Log, Logger, LoggerBuilder};
pub use sink::{MemorySink, Sink, WriterSink};
