// SPDX-License-Identifier: MIT OR Apache-2.0
//! Setup errors
use std::io;
use std::path::PathBuf;
use std::result;

use thiserror::Error;
use time::error::InvalidFormatDescription;

/// Result of logger setup
pub type Result<T, E = Error> = result::Result<T, E>;

/// An error while configuring a logger
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	#[error("Logger name must not be empty")]
	#[doc = "Logger name must not be empty"]
	EmptyName,
	#[error("Invalid line format {format:?}: {reason}")]
	/// Line template couldn't be parsed
	InvalidFormat {
		/// The offending template
		format: String,
		/// What is wrong with it
		reason: &'static str,
	},
	#[error("Invalid date format {format:?}: {source}")]
	/// Date format couldn't be parsed
	InvalidDateFormat {
		/// The offending format description
		format: String,
		/// Parser error
		source: InvalidFormatDescription,
	},
	#[error("Unknown log level {0:?}")]
	#[doc = "Unknown log level"]
	InvalidLevel(String),
	#[error("Failed to create log directory {path:?}: {source}")]
	/// Log directory was missing and couldn't be created
	DirectoryCreation {
		/// Directory that was being created
		path: PathBuf,
		/// Underlying error
		source: io::Error,
	},
	#[error("Failed to open log file {path:?}: {source}")]
	/// Log file couldn't be opened for appending
	FileOpen {
		/// File that was being opened
		path: PathBuf,
		/// Underlying error
		source: io::Error,
	},
}
