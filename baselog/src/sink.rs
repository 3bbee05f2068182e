// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output sinks
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::cell::Cell;
use std::sync::{Mutex, PoisonError, TryLockError};

use crate::dispatch::Record;
use crate::format::{DateFormat, LineFormat};
use crate::severity::Severity;
use crate::{Error, Result};

enum Output {
	Console,
	File(PathBuf, Mutex<File>),
	Writer(Mutex<Box<dyn Write + Send>>),
}

/// A destination for formatted log lines, with its own threshold and format
pub struct Sink {
	threshold: Severity,
	format: LineFormat,
	datefmt: DateFormat,
	output: Output,
}

impl Sink {
	/// Sink writing to standard error
	pub fn console(threshold: Severity, format: LineFormat, datefmt: DateFormat) -> Self {
		Self {
			threshold,
			format,
			datefmt,
			output: Output::Console,
		}
	}
	/// Sink appending to the file at `path`, creating it if needed
	/// # Errors
	/// if the file can't be opened for appending
	pub fn file(
		path: &Path,
		threshold: Severity,
		format: LineFormat,
		datefmt: DateFormat,
	) -> Result<Self> {
		let file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(path)
			.map_err(|source| Error::FileOpen {
				path: path.to_owned(),
				source,
			})?;
		Ok(Self {
			threshold,
			format,
			datefmt,
			output: Output::File(path.to_owned(), Mutex::new(file)),
		})
	}
	/// Sink writing to an arbitrary writer, one line per message
	pub fn writer<W: Write + Send + 'static>(
		writer: W,
		threshold: Severity,
		format: LineFormat,
		datefmt: DateFormat,
	) -> Self {
		Self {
			threshold,
			format,
			datefmt,
			output: Output::Writer(Mutex::new(Box::new(writer))),
		}
	}
	/// Least severe level this sink writes
	pub fn threshold(&self) -> Severity { self.threshold }
	/// File being written to, for file sinks
	pub fn path(&self) -> Option<&Path> {
		match &self.output {
			Output::File(path, _) => Some(path),
			Output::Console | Output::Writer(_) => None,
		}
	}
	pub(crate) fn emit(&self, record: &Record) {
		if record.level < self.threshold {
			return;
		}
		let mut line = String::new();
		self.format.render(&mut line, record, &self.datefmt);
		line.push('\n');
		// write the whole line at once so concurrent records don't interleave
		_ = match &self.output {
			Output::Console => io::stderr().lock().write_all(line.as_bytes()),
			Output::File(_, file) => with_lock(file, |file| file.write_all(line.as_bytes())),
			Output::Writer(writer) => with_lock(writer, |writer| writer.write_all(line.as_bytes())),
		};
	}
	pub(crate) fn flush(&self) {
		_ = match &self.output {
			Output::Console => io::stderr().lock().flush(),
			Output::File(_, file) => with_lock(file, Write::flush),
			Output::Writer(writer) => with_lock(writer, |writer| writer.flush()),
		};
	}
}

thread_local! {
	// set while this thread is inside a sink's lock
	static WRITING: Cell<bool> = const { Cell::new(false) };
}

struct Writing(bool);
impl Drop for Writing {
	fn drop(&mut self) { WRITING.set(self.0); }
}

// Lock `mutex` and run `action`. A panic raised while a sink is held reaches
// the panic hook on the same thread, which writes to the sinks again: there
// the lock is only tried, and a sink this thread already holds is skipped.
fn with_lock<T: ?Sized, F: FnOnce(&mut T) -> io::Result<()>>(
	mutex: &Mutex<T>,
	action: F,
) -> io::Result<()> {
	let mut guard = if WRITING.get() {
		match mutex.try_lock() {
			Ok(guard) => guard,
			Err(TryLockError::Poisoned(poison)) => poison.into_inner(),
			Err(TryLockError::WouldBlock) => return Err(io::ErrorKind::WouldBlock.into()),
		}
	} else {
		mutex.lock().unwrap_or_else(PoisonError::into_inner)
	};
	let _writing = Writing(WRITING.replace(true));
	action(&mut guard)
}
