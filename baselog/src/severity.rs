// SPDX-License-Identifier: MIT OR Apache-2.0
//! Message severities
use std::fmt;
use std::str::FromStr;

use log::Level;

use crate::Error;

/// Message severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
	/// Diagnostic detail
	#[default]
	Debug,
	/// Normal operation
	Info,
	/// Something unexpected that was recovered from
	Warning,
	/// An operation failed
	Error,
	/// The application can't continue, used for uncaught errors
	Critical,
}

impl Severity {
	/// Every severity, least severe first
	pub const ALL: [Self; 5] = [
		Self::Debug,
		Self::Info,
		Self::Warning,
		Self::Error,
		Self::Critical,
	];
	/// Upper-case name as printed in log lines
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Debug => "DEBUG",
			Self::Info => "INFO",
			Self::Warning => "WARNING",
			Self::Error => "ERROR",
			Self::Critical => "CRITICAL",
		}
	}
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

impl FromStr for Severity {
	type Err = Error;
	fn from_str(text: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|level| level.as_str().eq_ignore_ascii_case(text.trim()))
			.ok_or_else(|| Error::InvalidLevel(text.to_owned()))
	}
}

// `log` has no critical level and an extra trace level
impl From<Level> for Severity {
	fn from(level: Level) -> Self {
		match level {
			Level::Error => Self::Error,
			Level::Warn => Self::Warning,
			Level::Info => Self::Info,
			Level::Debug | Level::Trace => Self::Debug,
		}
	}
}

impl From<Severity> for Level {
	fn from(level: Severity) -> Self {
		match level {
			Severity::Debug => Self::Debug,
			Severity::Info => Self::Info,
			Severity::Warning => Self::Warn,
			Severity::Error | Severity::Critical => Self::Error,
		}
	}
}
