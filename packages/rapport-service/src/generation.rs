//! Generation-scoped cancellation shared by every list fetch.
//!
//! A session owns one [`Generations`]. Each change to the query advances it, which
//! invalidates every [`Ticket`] issued before the change.

use std::future::Future;

use tokio::sync::watch;

use crate::{Error, Result};

#[derive(Debug)]
pub struct Generations {
	tx: watch::Sender<u64>,
}
impl Generations {
	pub fn new() -> Self {
		Self { tx: watch::Sender::new(0) }
	}

	pub fn current(&self) -> u64 {
		*self.tx.borrow()
	}

	/// Starts a new generation and returns its ticket.
	pub fn advance(&self) -> Ticket {
		let mut generation = 0;

		self.tx.send_modify(|current| {
			*current += 1;
			generation = *current;
		});

		Ticket { generation, rx: self.tx.subscribe() }
	}

	/// Returns a ticket for the current generation without invalidating anything.
	pub fn ticket(&self) -> Ticket {
		Ticket { generation: self.current(), rx: self.tx.subscribe() }
	}
}
impl Default for Generations {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Clone, Debug)]
pub struct Ticket {
	generation: u64,
	rx: watch::Receiver<u64>,
}
impl Ticket {
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_current(&self) -> bool {
		*self.rx.borrow() == self.generation
	}

	/// Drives `future` until it resolves or the generation moves on.
	///
	/// Returns [`Error::Superseded`] when invalidated while pending, in which case `future` is
	/// dropped, and also when it resolved after invalidation. Dropping the owning
	/// [`Generations`] counts as invalidation.
	pub async fn run<F, T>(&self, future: F) -> Result<T>
	where
		F: Future<Output = T>,
	{
		let generation = self.generation;
		let mut rx = self.rx.clone();

		tokio::select! {
			biased;
			_ = rx.wait_for(|current| *current != generation) => Err(Error::Superseded),
			output = future =>
				if self.is_current() {
					Ok(output)
				} else {
					Err(Error::Superseded)
				},
		}
	}
}
