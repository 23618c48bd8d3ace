//! Process-wide logger and free functions delegating to it.
//!
//! Prefer passing a [`Logger`] explicitly. These functions exist for call
//! sites that cannot thread a handle through; they use the logger installed
//! with [`init`], or build one from the process arguments on first use.

use std::fmt::{self, Display};
use std::sync::OnceLock;

use crate::atomic_level::AtomicLevel;
use crate::error::LogError;
use crate::field::Field;
use crate::logger::{Log, Logger};

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Installs `logger` as the process-wide logger.
///
/// Fails once a logger is installed, including one built lazily by an
/// earlier logging call.
pub fn init(logger: Logger) -> Result<(), LogError> {
    GLOBAL
        .set(logger)
        .map_err(|_| LogError::AlreadyInitialized)
}

pub fn logger() -> &'static Logger {
    GLOBAL.get_or_init(Logger::from_env_args)
}

/// The global severity gate. Serve it with [`AtomicLevel::router`].
pub fn level_handler() -> AtomicLevel {
    logger().atomic_level().clone()
}

pub fn named(name: &str) -> Logger {
    logger().named(name)
}

pub fn with(fields: Vec<Field>) -> Logger {
    logger().with(fields)
}

pub fn sync() -> Result<(), LogError> {
    logger().sync()
}

macro_rules! delegate {
    ($plain:ident, $keyed:ident, $formatted:ident) => {
        #[track_caller]
        pub fn $plain(args: &[&dyn Display]) {
            logger().$plain(args)
        }

        #[track_caller]
        pub fn $keyed(msg: &str, fields: &[Field]) {
            logger().$keyed(msg, fields)
        }

        #[track_caller]
        pub fn $formatted(args: fmt::Arguments<'_>) {
            logger().$formatted(args)
        }
    };
}

delegate!(debug, debugw, debugf);
delegate!(info, infow, infof);
delegate!(warn, warnw, warnf);
delegate!(error, errorw, errorf);
delegate!(dpanic, dpanicw, dpanicf);

#[track_caller]
pub fn panic(args: &[&dyn Display]) -> ! {
    logger().panic(args)
}

#[track_caller]
pub fn panicw(msg: &str, fields: &[Field]) -> ! {
    logger().panicw(msg, fields)
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    logger().panicf(args)
}

#[track_caller]
pub fn fatal(args: &[&dyn Display]) -> ! {
    logger().fatal(args)
}

#[track_caller]
pub fn fatalw(msg: &str, fields: &[Field]) -> ! {
    logger().fatalw(msg, fields)
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    logger().fatalf(args)
}
