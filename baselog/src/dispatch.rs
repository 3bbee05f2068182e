// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named dispatchers, and the bridge from the [`log`] facade
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use log::{LevelFilter, Log, Metadata, set_logger, set_max_level};
use time::OffsetDateTime;

use crate::now;
use crate::severity::Severity;
use crate::sink::Sink;

/// One message on its way to the sinks
pub(crate) struct Record<'data> {
	pub(crate) time: OffsetDateTime,
	pub(crate) name: &'data str,
	pub(crate) target: &'data str,
	pub(crate) level: Severity,
	pub(crate) args: fmt::Arguments<'data>,
}

/// Named fan-out to every attached sink. Never filters by itself, each sink
/// applies its own threshold.
pub(crate) struct Dispatcher {
	name: Box<str>,
	sinks: RwLock<Vec<Sink>>,
}

// one dispatcher per name for the whole process
static REGISTRY: Mutex<BTreeMap<Box<str>, Arc<Dispatcher>>> = Mutex::new(BTreeMap::new());

impl Dispatcher {
	/// Fetch the dispatcher for `name`, creating it on first use
	pub(crate) fn named(name: &str) -> Arc<Self> {
		let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
		Arc::clone(registry.entry(name.into()).or_insert_with(|| {
			Arc::new(Self {
				name: name.into(),
				sinks: RwLock::new(Vec::new()),
			})
		}))
	}
	pub(crate) fn name(&self) -> &str { &self.name }
	/// Attach another sink. Sinks are never deduplicated.
	pub(crate) fn attach(&self, sink: Sink) {
		self.sinks
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(sink);
	}
	pub(crate) fn dispatch(&self, target: &str, level: Severity, args: fmt::Arguments<'_>) {
		let record = Record {
			time: now(),
			name: &self.name,
			target,
			level,
			args,
		};
		for sink in self.sinks.read().unwrap_or_else(PoisonError::into_inner).iter() {
			sink.emit(&record);
		}
	}
	pub(crate) fn flush(&self) {
		for sink in self.sinks.read().unwrap_or_else(PoisonError::into_inner).iter() {
			sink.flush();
		}
	}
}

// last configurator to ask for `log` records gets them
static FACADE: RwLock<Option<Arc<Dispatcher>>> = RwLock::new(None);

struct Bridge;
static BRIDGE: Bridge = Bridge;

impl Log for Bridge {
	fn enabled(&self, _meta: &Metadata) -> bool {
		FACADE.read().unwrap_or_else(PoisonError::into_inner).is_some()
	}
	fn log(&self, record: &log::Record) {
		let slot = FACADE.read().unwrap_or_else(PoisonError::into_inner);
		if let Some(dispatcher) = &*slot {
			dispatcher.dispatch(record.target(), record.level().into(), *record.args());
		}
	}
	fn flush(&self) {
		let slot = FACADE.read().unwrap_or_else(PoisonError::into_inner);
		if let Some(dispatcher) = &*slot {
			dispatcher.flush();
		}
	}
}

/// Route `log` records to `dispatcher`.
///
/// Returns `false` if some other logger already owns the `log` facade, in
/// which case nothing gets routed.
pub(crate) fn capture_log(dispatcher: &Arc<Dispatcher>) -> bool {
	static INSTALLED: OnceLock<bool> = OnceLock::new();
	let installed = *INSTALLED.get_or_init(|| {
		let ok = set_logger(&BRIDGE).is_ok();
		if ok {
			set_max_level(LevelFilter::Trace);
		}
		ok
	});
	if installed {
		*FACADE.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(dispatcher));
	}
	installed
}
