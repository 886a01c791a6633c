//! Leveled logging sink consumed by the application core.
//!
//! The core never talks to a logger directly; it writes through the
//! [`LogSink`] it was given. On target the sink is `DefmtLog`, on the
//! host tests use a recording sink.

use core::fmt;

/// Log severity, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Destination for leveled text messages.
pub trait LogSink {
    fn log(&mut self, level: Level, tag: &str, args: fmt::Arguments<'_>);
}

/// Forwards to `defmt`, prefixing the tag.
#[cfg(feature = "embedded")]
#[derive(Clone, Copy, Debug, Default)]
pub struct DefmtLog;

#[cfg(feature = "embedded")]
impl LogSink for DefmtLog {
    fn log(&mut self, level: Level, tag: &str, args: fmt::Arguments<'_>) {
        let msg = defmt::Display2Format(&args);
        match level {
            Level::Error => defmt::error!("[{=str}] {}", tag, msg),
            Level::Warn => defmt::warn!("[{=str}] {}", tag, msg),
            Level::Info => defmt::info!("[{=str}] {}", tag, msg),
            Level::Debug => defmt::debug!("[{=str}] {}", tag, msg),
            Level::Trace => defmt::trace!("[{=str}] {}", tag, msg),
        }
    }
}
