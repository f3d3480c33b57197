pub mod error;

use std::{
    io::Write,
    sync::{OnceLock, Mutex, MutexGuard},
};

use core::str::FromStr;

use termcolor::{WriteColor, StandardStream, ColorChoice};

pub use termcolor::{ColorSpec, Color};

use rustc_hash::FxHashMap;

use compact_str::CompactString;

use crate::{
    Result,
    fmt::{LogFmt, LogFmtBuilder, SegmentSpec},
};

use error::LogError;

/// Handle to a format registered with [`custom_fmt`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CustomFmt(usize);

impl CustomFmt {

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0
    }
}

#[repr(i8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Level {
    Always = -1,
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

#[derive(Clone, Copy, Debug)]
pub enum LevelFmt {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Other(CustomFmt, Level),
}

impl FromStr for Level {

    type Err = ();

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("error") {
            Ok(Self::Error)
        } else if s.eq_ignore_ascii_case("warn") {
            Ok(Self::Warn)
        } else if s.eq_ignore_ascii_case("info") {
            Ok(Self::Info)
        } else if s.eq_ignore_ascii_case("debug") {
            Ok(Self::Debug)
        } else if s.eq_ignore_ascii_case("trace") {
            Ok(Self::Trace)
        } else {
            Err(())
        }
    }
}

/// Per-target level filters parsed from a `RUST_LOG` style string.
#[derive(Clone, Debug)]
pub struct Filters {
    target_levels: FxHashMap<CompactString, Level>,
    base_level: Level,
}

impl Default for Filters {

    fn default() -> Self {
        Self {
            target_levels: FxHashMap::default(),
            base_level: Level::Error,
        }
    }
}

impl Filters {

    /// Parses comma separated `level` or `target=level` entries.
    ///
    /// Unknown levels are skipped. When a target is named twice the more restrictive level wins.
    pub fn parse(spec: &str) -> Self {
        let mut filters = Self::default();
        for arg in spec.split(',') {
            let (module, level) = match arg.find('=') {
                Some(j) => (Some(arg[0..j].trim()), arg[j + 1..].trim()),
                None => (None, arg.trim()),
            };
            let Ok(level) = Level::from_str(level) else {
                continue
            };
            if let Some(module) = module {
                let entry = filters.target_levels
                    .entry(CompactString::new(module))
                    .or_insert(level);
                *entry = (*entry).min(level);
            } else {
                filters.base_level = level;
            }
        }
        filters
    }

    fn from_env() -> Self {
        match std::env::var("RUST_LOG") {
            Ok(env) => Self::parse(&env),
            Err(_) => Self::default(),
        }
    }

    /// Resolves the level of `target`, falling back along `::` separated prefixes.
    pub fn target_level(&self, target: &str) -> Level {
        let mut substr = target;
        if let Some(&level) = self.target_levels.get(substr) {
            return level
        }
        while let Some(i) = substr.rfind("::") {
            substr = &substr[0..i];
            if let Some(&level) = self.target_levels.get(substr) {
                return level
            }
        }
        self.base_level
    }
}

struct Logger {
    stderr: StandardStream,
    info_fmt: LogFmt,
    warn_fmt: LogFmt,
    error_fmt: LogFmt,
    debug_fmt: LogFmt,
    trace_fmt: LogFmt,
    custom_fmt: Vec<LogFmt>,
    filters: Filters,
}

impl Logger {

    #[inline(always)]
    fn new(filters: Filters) -> Self {
        let label = |label: &str, color: Color| {
            let mut spec = ColorSpec::new();
            spec.set_fg(Some(color)).set_bold(true);
            LogFmt::labeled(label, spec)
        };
        Self {
            stderr: StandardStream::stderr(ColorChoice::Auto),
            info_fmt: label("info", Color::Green),
            warn_fmt: label("warn", Color::Yellow),
            error_fmt: label("error", Color::Red),
            debug_fmt: label("debug", Color::Blue),
            trace_fmt: label("trace", Color::Magenta),
            custom_fmt: Vec::new(),
            filters,
        }
    }

    fn log(&mut self, target: &str, level: LevelFmt, msg: core::fmt::Arguments) -> Result<bool> {
        let target_level = self.filters.target_level(target);
        let fmt = match level {
            LevelFmt::Error => {
                if target_level < Level::Error {
                    return Ok(false)
                }
                &self.error_fmt
            },
            LevelFmt::Warn => {
                if target_level < Level::Warn {
                    return Ok(false)
                }
                &self.warn_fmt
            },
            LevelFmt::Info => {
                if target_level < Level::Info {
                    return Ok(false)
                }
                &self.info_fmt
            },
            LevelFmt::Debug => {
                if target_level < Level::Debug {
                    return Ok(false)
                }
                &self.debug_fmt
            },
            LevelFmt::Trace => {
                if target_level < Level::Trace {
                    return Ok(false)
                }
                &self.trace_fmt
            },
            LevelFmt::Other(fmt, level) => {
                if target_level < level {
                    return Ok(false)
                }
                self.custom_fmt
                    .get(fmt.index())
                    .ok_or(LogError::UnknownFormat(fmt))?
            },
        };
        let mut stderr = self.stderr.lock();
        for segment in fmt {
            match segment {
                SegmentSpec::Message(log_spec) => {
                    if let Some(color_spec) = &log_spec.color_spec {
                        stderr.set_color(color_spec)?;
                        write!(stderr, "{}", msg)?;
                        stderr.reset()?;
                    } else {
                        write!(stderr, "{}", msg)?;
                    }
                },
                SegmentSpec::Text(text, log_spec) => {
                    if let Some(color_spec) = &log_spec.color_spec {
                        stderr.set_color(color_spec)?;
                        stderr.write_all(text.as_bytes())?;
                        stderr.reset()?;
                    } else {
                        stderr.write_all(text.as_bytes())?;
                    }
                },
            }
        }
        stderr.write_all(b"\n")?;
        Ok(true)
    }
}

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Initializes the global logger from `RUST_LOG`. Calling this more than once is harmless.
pub fn init() {
    let _ = LOGGER.get_or_init(|| Mutex::new(Logger::new(Filters::from_env())));
}

/// Initializes the global logger with explicit filters, unless already initialized.
///
/// Returns `false` if a logger was already in place.
pub fn init_with(filters: Filters) -> bool {
    let mut fresh = false;
    LOGGER.get_or_init(|| {
        fresh = true;
        Mutex::new(Logger::new(filters))
    });
    fresh
}

#[inline(always)]
pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}

#[inline(always)]
fn logger() -> Option<MutexGuard<'static, Logger>> {
    let logger = LOGGER.get()?;
    Some(logger.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
}

macro_rules! level_fmt {
    ($($name:ident => $field:ident),+ $(,)?) => {
        $(
            /// Rebuilds the line format of this level. Does nothing before [`init`].
            #[inline(always)]
            pub fn $name(mut f: impl FnMut(&mut LogFmtBuilder)) {
                if let Some(mut logger) = logger() {
                    let mut builder = LogFmtBuilder::new(&mut logger.$field);
                    f(&mut builder);
                }
            }
        )+
    };
}

level_fmt! {
    error_fmt => error_fmt,
    warn_fmt => warn_fmt,
    info_fmt => info_fmt,
    debug_fmt => debug_fmt,
    trace_fmt => trace_fmt,
}

/// Registers a custom line format, returning [`None`] before [`init`].
#[inline(always)]
pub fn custom_fmt(fmt: LogFmt) -> Option<CustomFmt> {
    let mut logger = logger()?;
    logger.custom_fmt.push(fmt);
    Some(CustomFmt(logger.custom_fmt.len() - 1))
}

/// Writes one line if `level` passes the filter of `target`.
///
/// Returns `Ok(false)` when the line was filtered out or the logger was never initialized.
#[inline(always)]
pub fn log(target: &str, level: LevelFmt, args: core::fmt::Arguments) -> Result<bool> {
    match logger() {
        Some(mut logger) => logger.log(target, level, args),
        None => Ok(false),
    }
}

#[macro_export]
macro_rules! error {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::log(module_path!(), $crate::LevelFmt::Error, format_args!($fmt, $($arg),*))
            .unwrap_or(false)
    };
}

#[macro_export]
macro_rules! warn {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::log(module_path!(), $crate::LevelFmt::Warn, format_args!($fmt, $($arg),*))
            .unwrap_or(false)
    };
}

#[macro_export]
macro_rules! info {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::log(module_path!(), $crate::LevelFmt::Info, format_args!($fmt, $($arg),*))
            .unwrap_or(false)
    };
}

#[macro_export]
macro_rules! debug {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::log(module_path!(), $crate::LevelFmt::Debug, format_args!($fmt, $($arg),*))
            .unwrap_or(false)
    };
}

#[macro_export]
macro_rules! trace {
    ($fmt:expr $(, $arg:expr)* $(,)?) => {
        $crate::log(module_path!(), $crate::LevelFmt::Trace, format_args!($fmt, $($arg),*))
            .unwrap_or(false)
    };
}
