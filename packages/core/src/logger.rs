//! Logger handle and the logging capability trait.
//!
//! [`Log`] lists every supported call: for each severity a plain form taking
//! display operands, a keyed form (`*w`) taking [`Field`]s and a formatted form
//! (`*f`) taking `format_args!`. Every provided method funnels into
//! [`Log::log`], so a test double only has to implement the handful of
//! required methods.
//!
//! Terminal levels keep their control-flow contract regardless of the gate:
//! `dpanic` panics in development mode, `panic` always panics and `fatal`
//! always runs the fatal hook, after the entry has been written.

use std::backtrace::Backtrace;
use std::ffi::OsStr;
use std::fmt::{self, Display, Write as _};
use std::panic::Location;
use std::sync::Arc;

use crate::atomic_level::AtomicLevel;
use crate::cli::scan_log_level;
use crate::encoder::{Caller, Entry, JsonEncoder};
use crate::error::LogError;
use crate::field::Field;
use crate::level::Level;
use crate::sink::{Sink, WriterSink};

/// What `fatal` does once the entry is written and synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalHook {
    /// Terminate the process with the given exit code.
    Exit(i32),
    /// Panic instead of exiting. Lets tests observe fatal calls.
    Panic,
}

impl Default for FatalHook {
    fn default() -> Self {
        FatalHook::Exit(1)
    }
}

/// Concatenates display operands without separators.
pub fn sprint(args: &[&dyn Display]) -> String {
    let mut message = String::new();
    for arg in args {
        let _ = write!(message, "{}", arg);
    }
    message
}

fn format_message(args: fmt::Arguments<'_>) -> String {
    match args.as_str() {
        Some(text) => text.to_string(),
        None => args.to_string(),
    }
}

macro_rules! leveled_methods {
    ($level:expr, $plain:ident, $keyed:ident, $formatted:ident) => {
        #[track_caller]
        fn $plain(&self, args: &[&dyn Display]) {
            if self.enabled($level) {
                self.log($level, &sprint(args), &[]);
            }
        }

        #[track_caller]
        fn $keyed(&self, msg: &str, fields: &[Field]) {
            self.log($level, msg, fields);
        }

        #[track_caller]
        fn $formatted(&self, args: fmt::Arguments<'_>) {
            if self.enabled($level) {
                self.log($level, &format_message(args), &[]);
            }
        }
    };
}

/// The logging capability set.
pub trait Log {
    /// Whether entries at `level` pass this logger's gate.
    fn enabled(&self, level: Level) -> bool;

    /// Writes one entry if `level` is enabled. Never panics or exits.
    #[track_caller]
    fn log(&self, level: Level, msg: &str, fields: &[Field]);

    /// Flushes buffered output.
    fn sync(&self) -> Result<(), LogError>;

    /// A child logger whose entries carry `name`, nested with `.`.
    fn named(&self, name: &str) -> Self
    where
        Self: Sized;

    /// A child logger that adds `fields` to every entry.
    fn with(&self, fields: Vec<Field>) -> Self
    where
        Self: Sized;

    fn development(&self) -> bool {
        false
    }

    fn fatal_hook(&self) -> FatalHook {
        FatalHook::default()
    }

    leveled_methods!(Level::Debug, debug, debugw, debugf);
    leveled_methods!(Level::Info, info, infow, infof);
    leveled_methods!(Level::Warn, warn, warnw, warnf);
    leveled_methods!(Level::Error, error, errorw, errorf);

    #[track_caller]
    fn dpanic(&self, args: &[&dyn Display]) {
        self.dpanicw(&sprint(args), &[]);
    }

    #[track_caller]
    fn dpanicw(&self, msg: &str, fields: &[Field]) {
        self.log(Level::DPanic, msg, fields);
        if self.development() {
            panic!("{}", msg);
        }
    }

    #[track_caller]
    fn dpanicf(&self, args: fmt::Arguments<'_>) {
        self.dpanicw(&format_message(args), &[]);
    }

    #[track_caller]
    fn panic(&self, args: &[&dyn Display]) -> ! {
        self.panicw(&sprint(args), &[])
    }

    #[track_caller]
    fn panicw(&self, msg: &str, fields: &[Field]) -> ! {
        self.log(Level::Panic, msg, fields);
        panic!("{}", msg)
    }

    #[track_caller]
    fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.panicw(&format_message(args), &[])
    }

    #[track_caller]
    fn fatal(&self, args: &[&dyn Display]) -> ! {
        self.fatalw(&sprint(args), &[])
    }

    #[track_caller]
    fn fatalw(&self, msg: &str, fields: &[Field]) -> ! {
        self.log(Level::Fatal, msg, fields);
        let _ = self.sync();
        match self.fatal_hook() {
            FatalHook::Exit(code) => std::process::exit(code),
            FatalHook::Panic => panic!("{}", msg),
        }
    }

    #[track_caller]
    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatalw(&format_message(args), &[])
    }
}

struct Core {
    level: AtomicLevel,
    encoder: JsonEncoder,
    sink: Arc<dyn Sink>,
    development: bool,
    add_caller: bool,
    stacktrace_level: Option<Level>,
    fatal_hook: FatalHook,
}

/// JSON logger writing through a shared severity gate.
///
/// Clones and derived handles (`named`, `with`) share the gate and sink.
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    name: Option<String>,
    context: Arc<Vec<Field>>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Builds the default stdout logger with its level taken from `args`
    /// (program name excluded). A missing or malformed `log-level` flag
    /// leaves the level at `info`; rejecting bad values is the job of the
    /// host's argument parser.
    pub fn from_args<I, S>(args: I) -> Logger
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Logger::builder().level_from_args(args).build()
    }

    /// [`Logger::from_args`] over the current process arguments.
    pub fn from_env_args() -> Logger {
        Self::from_args(std::env::args_os().skip(1))
    }

    /// The severity gate, shared with every derived handle.
    pub fn atomic_level(&self) -> &AtomicLevel {
        &self.core.level
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn context(&self) -> &[Field] {
        &self.context
    }

    /// Like [`Log::log`] but with an explicit source position, for entries
    /// that originate elsewhere (such as bridged `tracing` events).
    pub fn log_at(&self, level: Level, msg: &str, fields: &[Field], caller: Option<Caller>) {
        if self.enabled(level) {
            self.write_entry(level, msg, fields, caller);
        }
    }

    fn write_entry(&self, level: Level, msg: &str, fields: &[Field], caller: Option<Caller>) {
        let core = &self.core;
        let mut entry = Entry::new(level, msg);
        entry.logger_name = self.name.clone();
        if core.add_caller {
            entry.caller = caller;
        }
        if core.stacktrace_level.is_some_and(|min| level >= min) {
            entry.stack = Some(Backtrace::force_capture().to_string());
        }

        let line = core.encoder.encode(&entry, &self.context, fields);
        if let Err(err) = core.sink.write(&line) {
            eprintln!("{} write error: {}", entry.time.to_rfc3339(), err);
        }
    }
}

impl Log for Logger {
    fn enabled(&self, level: Level) -> bool {
        self.core.level.enabled(level)
    }

    #[track_caller]
    fn log(&self, level: Level, msg: &str, fields: &[Field]) {
        if self.enabled(level) {
            self.write_entry(level, msg, fields, Some(Location::caller().into()));
        }
    }

    fn sync(&self) -> Result<(), LogError> {
        self.core.sink.sync().map_err(LogError::Sync)
    }

    fn named(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let name = match &self.name {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.to_string(),
        };
        Logger {
            core: Arc::clone(&self.core),
            name: Some(name),
            context: Arc::clone(&self.context),
        }
    }

    fn with(&self, fields: Vec<Field>) -> Self {
        if fields.is_empty() {
            return self.clone();
        }
        let mut context = Vec::with_capacity(self.context.len() + fields.len());
        context.extend(self.context.iter().cloned());
        context.extend(fields);
        Logger {
            core: Arc::clone(&self.core),
            name: self.name.clone(),
            context: Arc::new(context),
        }
    }

    fn development(&self) -> bool {
        self.core.development
    }

    fn fatal_hook(&self) -> FatalHook {
        self.core.fatal_hook
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.core.level.level())
            .field("context", &self.context.len())
            .field("development", &self.core.development)
            .finish()
    }
}

/// Configures a [`Logger`]. Defaults: `info`, production JSON keys, stdout,
/// caller on, no stacktraces, exit code 1 on fatal.
pub struct LoggerBuilder {
    level: AtomicLevel,
    encoder: JsonEncoder,
    sink: Option<Arc<dyn Sink>>,
    development: bool,
    add_caller: bool,
    stacktrace_level: Option<Level>,
    fatal_hook: FatalHook,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            level: AtomicLevel::default(),
            encoder: JsonEncoder::default(),
            sink: None,
            development: false,
            add_caller: true,
            stacktrace_level: None,
            fatal_hook: FatalHook::default(),
        }
    }
}

impl LoggerBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.level = AtomicLevel::new(level);
        self
    }

    /// Sets the level from a `log-level` flag in `args`, defaulting to
    /// `info` when the flag is absent or its value is malformed.
    pub fn level_from_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let level = scan_log_level(args).ok().flatten().unwrap_or_default();
        self.level(level)
    }

    /// Uses an existing gate, so the logger follows its updates.
    pub fn atomic_level(mut self, level: AtomicLevel) -> Self {
        self.level = level;
        self
    }

    pub fn encoder(mut self, encoder: JsonEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    pub fn add_caller(mut self, add_caller: bool) -> Self {
        self.add_caller = add_caller;
        self
    }

    /// Attaches a captured backtrace to entries at or above `level`.
    pub fn stacktrace_level(mut self, level: Level) -> Self {
        self.stacktrace_level = Some(level);
        self
    }

    pub fn fatal_hook(mut self, hook: FatalHook) -> Self {
        self.fatal_hook = hook;
        self
    }

    pub fn build(self) -> Logger {
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(WriterSink::stdout()));
        Logger {
            core: Arc::new(Core {
                level: self.level,
                encoder: self.encoder,
                sink,
                development: self.development,
                add_caller: self.add_caller,
                stacktrace_level: self.stacktrace_level,
                fatal_hook: self.fatal_hook,
            }),
            name: None,
            context: Arc::new(Vec::new()),
        }
    }
}
