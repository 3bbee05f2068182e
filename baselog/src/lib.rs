// SPDX-License-Identifier: MIT OR Apache-2.0
//! Standard logging setup for an application:
//! - Console output on `stderr`, optional output appended to a file
//! - Both outputs filter by their own level and use their own format
//! - Panics (and errors escaping `main`) get logged as numbered lines
//!
//! | Output | Default level | Default line |
//! |-|-|-|
//! | `stderr` | `DEBUG` | `2023-04-11T11:16:43+0200 - app - INFO - hello` |
//! | `{directory}/{name}_{timestamp}.log` | `DEBUG` | same as console |
//!
//! Get started by creating [`Settings`] and calling [`init`]:
//! ```no_run
//! let logger = baselog::Settings::new("app").init()?;
//! baselog::info!(logger, "started with {} workers", 4);
//! # Ok::<_, baselog::Error>(())
//! ```
//!
//! A panic anywhere in the process then shows up as
//! ```text
//! ... - app - CRITICAL - uncaught panic exception:
//! ... - app - CRITICAL - exception L0: first line of the message
//! ... - app - CRITICAL - traceback L0: thread 'main' panicked at src/main.rs:4:5
//! ```
//!
//! ## Known limitations
//! - There is one panic hook per process, the configurator initialized last
//!   receives every panic. The hook also runs for panics that are later
//!   caught with [`catch_unwind`](std::panic::catch_unwind).
//! - Initializing the same name twice attaches a second set of sinks to the
//!   same logger, so every line is written twice.
//! - Log files are never closed, they stay open until the process exits.
//!
//! [`init`]: Settings::init

use std::env;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// For convenience :)
pub use log;
use time::OffsetDateTime;

mod dispatch;
mod error;
mod format;
mod severity;
mod sink;
mod uncaught;


use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use format::{DEFAULT_DATEFMT, DEFAULT_FORMAT, DateFormat, LineFormat};
pub use severity::Severity;
pub use sink::Sink;
pub use uncaught::{Trace, Uncaught, hook_owner, zeropad_width};

/// Log directory used when none is given
pub const DEFAULT_DIRECTORY: &str = "/log";

/// Settings for a logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
	/// Logger name, printed in every line and used for the default file name
	pub name: String,
	/// Directory for the log file, created if missing. `None` disables the
	/// file output
	pub directory: Option<PathBuf>,
	/// Log file name, defaults to `{name}_{timestamp}.log`
	pub file_name: Option<String>,
	/// Least severe level printed to the console
	pub console_level: Severity,
	/// Least severe level written to the file
	pub file_level: Severity,
	/// Console line template, see [`LineFormat`]
	pub console_format: Option<String>,
	/// File line template, see [`LineFormat`]
	pub file_format: Option<String>,
	/// Console timestamp format, see [`DateFormat`]
	pub console_datefmt: Option<String>,
	/// File timestamp format, also used for the default file name
	pub file_datefmt: Option<String>,
	/// Also log records sent through the [`log`] macros
	pub capture_log: bool,
}

impl Settings {
	/// Default settings for a logger called `name`
	pub fn new<N: Into<String>>(name: N) -> Self {
		Self {
			name: name.into(),
			directory: Some(PathBuf::from(DEFAULT_DIRECTORY)),
			file_name: None,
			console_level: Severity::Debug,
			file_level: Severity::Debug,
			console_format: None,
			file_format: None,
			console_datefmt: None,
			file_datefmt: None,
			capture_log: true,
		}
	}
	/// Apply overrides from the environment:
	/// - `BASELOG_DIR`: log directory, empty to disable the file
	/// - `BASELOG_CONSOLE_LEVEL`, `BASELOG_FILE_LEVEL`: level names
	/// # Errors
	/// if a level isn't recognized
	pub fn with_env(self) -> Result<Self> { self.with_vars(|key| env::var(key).ok()) }
	/// [`with_env`](Self::with_env) with a custom variable lookup
	/// # Errors
	/// if a level isn't recognized
	pub fn with_vars<F: Fn(&str) -> Option<String>>(mut self, lookup: F) -> Result<Self> {
		if let Some(dir) = lookup("BASELOG_DIR") {
			self.directory = (!dir.is_empty()).then(|| PathBuf::from(dir));
		}
		if let Some(level) = lookup("BASELOG_CONSOLE_LEVEL") {
			self.console_level = level.parse()?;
		}
		if let Some(level) = lookup("BASELOG_FILE_LEVEL") {
			self.file_level = level.parse()?;
		}
		Ok(self)
	}
	/// Attach the console (and file) output to the logger called `name`, and
	/// make it the receiver of panics.
	///
	/// The console output is attached before the log directory and file are
	/// touched, so it stays attached if those fail.
	/// # Errors
	/// - [`Error::EmptyName`], [`Error::InvalidFormat`],
	///   [`Error::InvalidDateFormat`]: nothing was attached
	/// - [`Error::DirectoryCreation`], [`Error::FileOpen`]: the file output
	///   couldn't be set up
	pub fn init(self) -> Result<BaseLog> {
		let Self {
			name,
			directory,
			file_name,
			console_level,
			file_level,
			console_format,
			file_format,
			console_datefmt,
			file_datefmt,
			capture_log,
		} = self;
		if name.is_empty() {
			return Err(Error::EmptyName);
		}
		let console_format = line_format(console_format.as_deref())?;
		let console_datefmt = date_format(console_datefmt.as_deref())?;
		let file_format = line_format(file_format.as_deref())?;
		let file_datefmt = date_format(file_datefmt.as_deref())?;

		let dispatcher = Dispatcher::named(&name);
		dispatcher.attach(Sink::console(console_level, console_format, console_datefmt));
		uncaught::install_hook(&dispatcher);
		if capture_log && !dispatch::capture_log(&dispatcher) {
			dispatcher.dispatch(
				&name,
				Severity::Warning,
				format_args!("another logger owns the log facade, its records are not captured"),
			);
		}

		let mut file_path = None;
		if let Some(directory) = directory.filter(|dir| !dir.as_os_str().is_empty()) {
			if !directory.is_dir() {
				fs::create_dir_all(&directory).map_err(|source| Error::DirectoryCreation {
					path: directory.clone(),
					source,
				})?;
			}
			let file_name = file_name
				.unwrap_or_else(|| format!("{name}_{}.log", file_datefmt.format(now())));
			let path = directory.join(file_name);
			dispatcher.attach(Sink::file(&path, file_level, file_format, file_datefmt)?);
			file_path = Some(path);
		}
		Ok(BaseLog {
			dispatcher,
			file_path,
		})
	}
}

fn line_format(template: Option<&str>) -> Result<LineFormat> {
	template.map_or_else(|| Ok(LineFormat::default()), LineFormat::parse)
}

fn date_format(description: Option<&str>) -> Result<DateFormat> {
	description.map_or_else(|| Ok(DateFormat::default()), DateFormat::parse)
}

/// Handle to a configured logger, see [`Settings::init`]
#[derive(Clone)]
pub struct BaseLog {
	dispatcher: Arc<Dispatcher>,
	file_path: Option<PathBuf>,
}

impl BaseLog {
	/// Logger name
	pub fn name(&self) -> &str { self.dispatcher.name() }
	/// Log file this handle set up, if any
	pub fn file_path(&self) -> Option<&Path> { self.file_path.as_deref() }
	/// Log a message at `level`
	pub fn log(&self, level: Severity, args: fmt::Arguments<'_>) {
		self.dispatcher.dispatch(self.dispatcher.name(), level, args);
	}
	/// Log a [`Severity::Debug`] message
	pub fn debug(&self, args: fmt::Arguments<'_>) { self.log(Severity::Debug, args); }
	/// Log a [`Severity::Info`] message
	pub fn info(&self, args: fmt::Arguments<'_>) { self.log(Severity::Info, args); }
	/// Log a [`Severity::Warning`] message
	pub fn warning(&self, args: fmt::Arguments<'_>) { self.log(Severity::Warning, args); }
	/// Log a [`Severity::Error`] message
	pub fn error(&self, args: fmt::Arguments<'_>) { self.log(Severity::Error, args); }
	/// Log a [`Severity::Critical`] message
	pub fn critical(&self, args: fmt::Arguments<'_>) { self.log(Severity::Critical, args); }
	/// Attach another sink to this logger
	pub fn add_sink(&self, sink: Sink) { self.dispatcher.attach(sink); }
	/// Flush every sink
	pub fn flush(&self) { self.dispatcher.flush(); }
	/// Log an uncaught error the same way the panic hook does:
	/// a header line, then one numbered line per message and trace line.
	pub fn handle_uncaught(&self, uncaught: &Uncaught) { uncaught::report(&self.dispatcher, uncaught); }
	/// Log an error that is about to end the program, e.g. one returned
	/// from `main`. The [`source`](StdError::source) chain is logged as the
	/// traceback.
	pub fn report_error<E: StdError + ?Sized>(&self, error: &E) {
		self.handle_uncaught(&Uncaught::from_error(error));
	}
}

impl fmt::Debug for BaseLog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BaseLog")
			.field("name", &self.name())
			.field("file_path", &self.file_path)
			.finish_non_exhaustive()
	}
}

fn now() -> OffsetDateTime {
	OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Log a debug message: `debug!(logger, "format {}", args)`
#[macro_export]
macro_rules! debug {
	($logger:expr, $($arg:tt)+) => {
		$logger.debug(::core::format_args!($($arg)+))
	};
}
/// Log an info message: `info!(logger, "format {}", args)`
#[macro_export]
macro_rules! info {
	($logger:expr, $($arg:tt)+) => {
		$logger.info(::core::format_args!($($arg)+))
	};
}
/// Log a warning: `warning!(logger, "format {}", args)`
#[macro_export]
macro_rules! warning {
	($logger:expr, $($arg:tt)+) => {
		$logger.warning(::core::format_args!($($arg)+))
	};
}
/// Log an error message: `error!(logger, "format {}", args)`
#[macro_export]
macro_rules! error {
	($logger:expr, $($arg:tt)+) => {
		$logger.error(::core::format_args!($($arg)+))
	};
}
/// Log a critical message: `critical!(logger, "format {}", args)`
#[macro_export]
macro_rules! critical {
	($logger:expr, $($arg:tt)+) => {
		$logger.critical(::core::format_args!($($arg)+))
	};
}
