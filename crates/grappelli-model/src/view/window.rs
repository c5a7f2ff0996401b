//! Nested-range window arithmetic
//!
//! A window selects positions out of the backend's enumeration of the
//! filtered set: `start` is the first position, `step` walks that enumeration
//! (negative steps walk it backwards), `count` bounds the number of yielded
//! items, and `flipped` records that the ordering direction sent to the
//! backend is the reverse of the view's declared ordering. Composition is
//! pure arithmetic; nothing here performs I/O.
//!
//! Invariant: a negative step only ever appears on a bounded window, so every
//! selected position stays non-negative.

use grappelli_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
	start: u64,
	count: Option<u64>,
	step: i64,
	flipped: bool,
}

impl Window {
	/// The whole enumeration, forward, one request direction from the view's ordering.
	pub fn unbounded() -> Self {
		Window {
			start: 0,
			count: None,
			step: 1,
			flipped: false,
		}
	}

	pub fn start(&self) -> u64 {
		self.start
	}

	/// Nominal number of items, `None` when unbounded.
	pub fn count(&self) -> Option<u64> {
		self.count
	}

	pub fn step(&self) -> i64 {
		self.step
	}

	/// Whether the backend ordering direction is reversed relative to the view's.
	pub fn is_flipped(&self) -> bool {
		self.flipped
	}

	/// Backend position of the window's i-th item; no bounds check.
	///
	/// Callers must keep `i` inside the window's count — composition
	/// guarantees the result is non-negative there.
	pub(crate) fn position_of(&self, index: u64) -> u64 {
		let position = self.start as i128 + index as i128 * self.step as i128;
		debug_assert!(position >= 0, "window arithmetic produced a negative offset");
		position as u64
	}

	/// Sub-window of items `from..to` (`to = None` leaves the end open).
	///
	/// Nested-range arithmetic: the new start is `start + from*step`, the
	/// step is unchanged, and the new length is bounded by both the range
	/// span and the remaining outer length.
	pub fn slice(&self, from: u64, to: Option<u64>) -> Window {
		let available = self.count.map(|count| count.saturating_sub(from));
		let span = to.map(|to| to.saturating_sub(from));
		let count = match (available, span) {
			(Some(available), Some(span)) => Some(available.min(span)),
			(Some(available), None) => Some(available),
			(None, span) => span,
		};

		if count == Some(0) {
			// Nothing selected; keep the old anchor rather than stepping past it.
			return Window {
				start: self.start,
				count: Some(0),
				step: self.step,
				flipped: self.flipped,
			};
		}
		Window {
			start: self.position_of(from),
			count,
			step: self.step,
			flipped: self.flipped,
		}
	}

	/// Keep every `step`-th item; negative steps reverse first.
	pub fn step_by(&self, step: i64) -> Result<Window> {
		if step == 0 {
			return Err(Error::validation("step", "slice step cannot be zero"));
		}
		if step < 0 {
			return self.reversed()?.step_by(-step);
		}
		if step == 1 {
			return Ok(*self);
		}
		Ok(Window {
			start: self.start,
			count: self.count.map(|count| count.div_ceil(step as u64)),
			step: self.step * step,
			flipped: self.flipped,
		})
	}

	/// Same items in reverse order.
	///
	/// A bounded window reverses by pure arithmetic: the new start is its old
	/// last position and the step flips sign. The full unbounded window
	/// reverses by flipping the ordering direction sent to the backend —
	/// only the backend knows the total count, so a partially-consumed
	/// unbounded window cannot be reversed at all.
	pub fn reversed(&self) -> Result<Window> {
		match self.count {
			Some(0) => Ok(*self),
			Some(count) => Ok(Window {
				start: self.position_of(count - 1),
				count: Some(count),
				step: -self.step,
				flipped: self.flipped,
			}),
			None if self.start == 0 && self.step == 1 => Ok(Window {
				start: 0,
				count: None,
				step: 1,
				flipped: !self.flipped,
			}),
			None => Err(Error::Unsupported(
				"reversing a partially-consumed unbounded view requires the total record count"
					.to_string(),
			)),
		}
	}

	/// Backend position of one indexed item.
	///
	/// Negative indexes resolve only against a bounded window's nominal
	/// length; resolving them against the server's true count would cost a
	/// hidden length query.
	pub fn position(&self, index: i64) -> Result<u64> {
		if index >= 0 {
			if let Some(count) = self.count
				&& index as u64 >= count
			{
				return Err(Error::out_of_bounds(index, "index beyond the window's length"));
			}
			return Ok(self.position_of(index as u64));
		}

		let Some(count) = self.count else {
			return Err(Error::out_of_bounds(index, "negative index on an unbounded view"));
		};
		let from_end = count as i128 + index as i128;
		if from_end < 0 {
			return Err(Error::out_of_bounds(index, "index beyond the window's length"));
		}
		Ok(self.position_of(from_end as u64))
	}

	/// Items that actually exist given the backend's reported total.
	pub fn clamped_len(&self, total: u64) -> u64 {
		if self.step > 0 {
			let span = if total > self.start {
				(total - self.start).div_ceil(self.step as u64)
			} else {
				0
			};
			return self.count.map_or(span, |count| count.min(span));
		}

		// Negative step: bounded by invariant. Positions descend from start;
		// the leading ones may lie beyond the total and simply not exist.
		let count = self.count.unwrap_or(0);
		let magnitude = self.step.unsigned_abs();
		let missing = if self.start >= total {
			(self.start - total) / magnitude + 1
		} else {
			0
		};
		count.saturating_sub(missing)
	}
}
