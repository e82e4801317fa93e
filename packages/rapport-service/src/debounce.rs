//! Debounced search input.
//!
//! Raw keystrokes are echoed immediately. The committed value follows only after the raw
//! value has been stable for the quiet period, so a burst of input commits once.

use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle, time};

#[derive(Debug)]
pub struct DebouncedSearch {
	raw: watch::Sender<String>,
	committed: watch::Receiver<String>,
	task: JoinHandle<()>,
}
impl DebouncedSearch {
	/// Spawns the debounce timer on the current Tokio runtime.
	pub fn spawn(quiet: Duration) -> Self {
		let (raw, raw_rx) = watch::channel(String::new());
		let (committed_tx, committed) = watch::channel(String::new());
		let task = tokio::spawn(debounce(raw_rx, committed_tx, quiet));

		Self { raw, committed, task }
	}

	pub fn set_raw(&self, value: impl Into<String>) {
		self.raw.send_replace(value.into());
	}

	pub fn raw(&self) -> String {
		self.raw.borrow().clone()
	}

	pub fn committed(&self) -> String {
		self.committed.borrow().clone()
	}

	/// True while the raw value differs from the committed one.
	pub fn is_searching(&self) -> bool {
		*self.raw.borrow() != *self.committed.borrow()
	}

	/// Receiver notified on every commit.
	pub fn subscribe(&self) -> watch::Receiver<String> {
		self.committed.clone()
	}
}
impl Drop for DebouncedSearch {
	fn drop(&mut self) {
		self.task.abort();
	}
}

async fn debounce(
	mut raw: watch::Receiver<String>,
	committed: watch::Sender<String>,
	quiet: Duration,
) {
	while raw.changed().await.is_ok() {
		// Every further change restarts the quiet period.
		loop {
			match time::timeout(quiet, raw.changed()).await {
				Ok(Ok(())) => continue,
				Ok(Err(_)) => return,
				Err(_) => break,
			}
		}

		let value = raw.borrow_and_update().clone();

		committed.send_if_modified(|current| {
			if *current == value {
				return false;
			}

			*current = value;

			true
		});
	}
}
