// SPDX-License-Identifier: MIT OR Apache-2.0
//! Numbered reports for errors nobody caught
use std::any::type_name;
use std::error::Error;
use std::fmt;
use std::panic::{self, PanicHookInfo};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

use crate::dispatch::Dispatcher;
use crate::severity::Severity;

/// Zero-padding width needed to print every index in `0..count`.
///
/// ```
/// # use baselog::zeropad_width;
/// assert_eq!(zeropad_width(10), 1);
/// assert_eq!(zeropad_width(11), 2);
/// ```
pub fn zeropad_width(count: usize) -> usize {
	match count.checked_sub(1) {
		None | Some(0) => 1,
		Some(max) => max.ilog10() as usize + 1,
	}
}

fn is_line_break(ch: char) -> bool {
	matches!(
		ch,
		'\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
	)
}

/// Split on every line boundary, `\r\n` counting as one. Unlike
/// [`str::lines`] this also breaks on lone `\r` and the unicode separators.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
	let mut lines = Vec::new();
	let mut rest = text;
	while !rest.is_empty() {
		let Some((at, ch)) = rest.char_indices().find(|&(_, ch)| is_line_break(ch)) else {
			lines.push(rest);
			break;
		};
		let (line, tail) = rest.split_at(at);
		lines.push(line);
		let mut tail = tail.chars();
		tail.next();
		rest = tail.as_str();
		if ch == '\r' {
			rest = rest.strip_prefix('\n').unwrap_or(rest);
		}
	}
	lines
}

/// Rendered stack trace, one entry per frame. Frames may span several lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
	frames: Vec<String>,
}

impl Trace {
	/// Trace made of already-rendered frames
	pub fn new(frames: Vec<String>) -> Self { Self { frames } }
	/// Append a frame
	pub fn push(&mut self, frame: String) { self.frames.push(frame); }
	/// Rendered frames
	pub fn frames(&self) -> &[String] { &self.frames }
	/// Every line of every frame, in order
	pub fn lines(&self) -> Vec<&str> {
		self.frames.iter().flat_map(|frame| split_lines(frame)).collect()
	}
	// capture the current thread's stack, if backtraces are enabled
	#[cfg(not(feature = "backtrace"))]
	fn capture(&mut self) {
		use std::backtrace::{Backtrace, BacktraceStatus};
		let trace = Backtrace::capture();
		if trace.status() == BacktraceStatus::Captured {
			self.push(trace.to_string());
		}
	}
	#[cfg(feature = "backtrace")]
	fn capture(&mut self) {
		use std::fmt::Write;
		let trace = backtrace::Backtrace::new();
		for (index, frame) in trace.frames().iter().enumerate() {
			let mut text = String::new();
			let symbols = frame.symbols();
			if symbols.is_empty() {
				_ = write!(text, "{index:>4}: <unknown> {:?}", frame.ip());
			}
			for symbol in symbols {
				if !text.is_empty() {
					text.push('\n');
				}
				match symbol.name() {
					Some(name) => _ = write!(text, "{index:>4}: {name}"),
					None => _ = write!(text, "{index:>4}: <unknown>"),
				}
				if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
					_ = write!(text, "\n      at {}:{line}", file.display());
				}
			}
			self.push(text);
		}
	}
}

/// An error that reached the top of the program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uncaught {
	/// Category of the error, printed in the header line
	pub kind: String,
	/// Error text, possibly multi-line
	pub message: String,
	/// Where it came from, if known
	pub trace: Option<Trace>,
}

impl Uncaught {
	/// Error without a trace
	pub fn new<K: Into<String>, M: Into<String>>(kind: K, message: M) -> Self {
		Self {
			kind: kind.into(),
			message: message.into(),
			trace: None,
		}
	}
	/// Attach a trace
	#[must_use]
	pub fn with_trace(self, trace: Trace) -> Self {
		Self {
			trace: Some(trace),
			..self
		}
	}
	/// Describe an error value: its type name, its message, and its
	/// [`source`](Error::source) chain as the trace.
	pub fn from_error<E: Error + ?Sized>(error: &E) -> Self {
		let mut trace = Trace::default();
		let mut source = error.source();
		while let Some(cause) = source {
			trace.push(format!("caused by: {cause}"));
			source = cause.source();
		}
		Self {
			kind: short_type_name(type_name::<E>()).to_owned(),
			message: error.to_string(),
			trace: (!trace.frames.is_empty()).then_some(trace),
		}
	}
	fn from_panic(info: &PanicHookInfo) -> Self {
		let payload = info.payload();
		let message = payload
			.downcast_ref::<&str>()
			.copied()
			.or_else(|| payload.downcast_ref::<String>().map(String::as_str))
			.unwrap_or("Box<dyn Any>");
		let mut trace = Trace::default();
		if let Some(location) = info.location() {
			let thread = thread::current();
			trace.push(format!(
				"thread '{}' panicked at {location}",
				thread.name().unwrap_or("<unnamed>")
			));
		}
		trace.capture();
		Self {
			kind: "panic".to_owned(),
			message: message.to_owned(),
			trace: (!trace.frames.is_empty()).then_some(trace),
		}
	}
}

// `alloc::vec::Vec<u8>` → `Vec`, `dyn core::error::Error` → `Error`
fn short_type_name(name: &str) -> &str {
	let name = name.split('<').next().unwrap_or(name);
	name.rsplit("::").next().unwrap_or(name)
}

/// Log `uncaught` through `dispatcher` as numbered critical lines
pub(crate) fn report(dispatcher: &Dispatcher, uncaught: &Uncaught) {
	fn critical(dispatcher: &Dispatcher, args: fmt::Arguments<'_>) {
		dispatcher.dispatch(dispatcher.name(), Severity::Critical, args);
	}
	critical(dispatcher, format_args!("uncaught {} exception:", uncaught.kind));
	let mut lines = split_lines(&uncaught.message);
	if lines.is_empty() {
		lines.push("");
	}
	let width = zeropad_width(lines.len());
	for (index, line) in lines.iter().enumerate() {
		critical(dispatcher, format_args!("exception L{index:0width$}: {}", line.trim_end()));
	}
	if let Some(trace) = &uncaught.trace {
		let lines = trace.lines();
		let width = zeropad_width(lines.len());
		for (index, line) in lines.iter().enumerate() {
			critical(dispatcher, format_args!("traceback L{index:0width$}: {}", line.trim_end()));
		}
	}
	dispatcher.flush();
}

// whoever installed the panic hook last
static HOOK: RwLock<Option<Arc<Dispatcher>>> = RwLock::new(None);

/// Make `dispatcher` the receiver of every panic, replacing any earlier hook
pub(crate) fn install_hook(dispatcher: &Arc<Dispatcher>) {
	*HOOK.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(dispatcher));
	panic::set_hook(Box::new(|info| {
		let uncaught = Uncaught::from_panic(info);
		let owner = HOOK.read().unwrap_or_else(PoisonError::into_inner);
		if let Some(dispatcher) = &*owner {
			report(dispatcher, &uncaught);
		}
	}));
}

/// Name of the logger currently receiving panics
pub fn hook_owner() -> Option<String> {
	let owner = HOOK.read().unwrap_or_else(PoisonError::into_inner);
	owner.as_ref().map(|dispatcher| dispatcher.name().to_owned())
}
