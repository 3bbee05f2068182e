// SPDX-License-Identifier: MIT OR Apache-2.0
//! example log use

use baselog::{Settings, Severity};

fn main() -> baselog::Result<()> {
	let logger = Settings {
		directory: Some("target/demo-logs".into()),
		console_level: Severity::Info,
		..Settings::new("demo")
	}
	.with_env()?
	.init()?;
	baselog::debug!(logger, "only in the file");
	baselog::info!(logger, "Info: {}", 7);
	baselog::warning!(logger, "Warn {:?}", [0, 9, 8, 7]);
	baselog::error!(logger, "Error");
	baselog::log::info!("through the log facade");
	if let Some(path) = logger.file_path() {
		baselog::info!(logger, "also written to {}", path.display());
	}
	panic!("Panic Message\nwith a second line");
}
