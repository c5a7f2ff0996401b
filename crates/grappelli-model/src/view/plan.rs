//! Pure request planning for view materialization
//!
//! The cursor turns a resolved window into the exact sequence of list
//! requests a materialization issues, and folds each raw response back into
//! yield order. It performs no I/O itself — both execution disciplines drive
//! the same cursor and differ only in how the requests are carried out.
//!
//! Contiguous windows (step magnitude 1) are served in fixed-size batches;
//! any other stride degrades to one request per yielded item, which is
//! explicitly costly because the backend has no stride primitive.

use grappelli_client::{ListRequest, ListResponse};
use grappelli_core::{Error, JsonMap, OrderBy, Result};

use super::window::Window;

pub(crate) struct BatchCursor {
	module: String,
	filter: JsonMap,
	order_by: OrderBy,
	window: Window,
	batch_size: u64,
	yielded: u64,
	finished: bool,
}

impl BatchCursor {
	pub(crate) fn new(
		module: String,
		filter: JsonMap,
		order_by: OrderBy,
		window: Window,
		batch_size: u64,
	) -> Self {
		BatchCursor {
			module,
			filter,
			order_by,
			window,
			batch_size,
			yielded: 0,
			finished: false,
		}
	}

	/// The next list request, or `None` when the window is exhausted.
	pub(crate) fn next_request(&self) -> Option<ListRequest> {
		if self.finished {
			return None;
		}
		let remaining = match self.window.count() {
			Some(count) => {
				if self.yielded >= count {
					return None;
				}
				Some(count - self.yielded)
			}
			None => None,
		};

		let step = self.window.step();
		let (offset, limit) = if step.unsigned_abs() == 1 {
			let limit = remaining.map_or(self.batch_size, |left| left.min(self.batch_size));
			if step > 0 {
				(self.window.position_of(self.yielded), limit)
			} else {
				// A descending batch covers the contiguous ascending range it
				// spans and is reordered after the fetch.
				let high = self.window.position_of(self.yielded);
				let limit = limit.min(high + 1);
				(high + 1 - limit, limit)
			}
		} else {
			(self.window.position_of(self.yielded), 1)
		};

		Some(ListRequest {
			module: self.module.clone(),
			filter: self.filter.clone(),
			order_by: Some(self.order_by.clone()),
			offset,
			limit,
		})
	}

	/// Fold one response into yield order and advance the cursor.
	pub(crate) fn absorb(
		&mut self,
		request: &ListRequest,
		response: ListResponse,
	) -> Result<Vec<JsonMap>> {
		let got = response.records.len() as u64;
		if got > request.limit {
			return Err(Error::InvalidResponse(format!(
				"requested at most {} records, got {got}",
				request.limit
			)));
		}

		let step = self.window.step();
		if step.unsigned_abs() == 1 {
			if step > 0 {
				self.yielded += got;
				// A short page means the data ran out.
				if got < request.limit {
					self.finished = true;
				}
				return Ok(response.records);
			}
			// Descending: all planned positions are consumed whether or not a
			// row exists there; missing rows are the high offsets past the
			// total, which simply drop out of the reversed page.
			self.yielded += request.limit;
			let mut records = response.records;
			records.reverse();
			return Ok(records);
		}

		// Strided single-item fetch.
		if got == 0 {
			if step > 0 {
				self.finished = true;
			} else {
				self.yielded += 1;
			}
			return Ok(Vec::new());
		}
		self.yielded += 1;
		Ok(response.records)
	}
}
