use super::types::{Bias, Edit, Insertion, Operation};
use crate::Rope;
use crate::edit::EditError;
use crate::range::{CharIdx, CharLen};

/// A sequence of retain/delete/insert operations taking a document of
/// length [`Self::len`] to one of length [`Self::len_after`].
///
/// Every buffer edit is recorded as one changeset; span tracking maps
/// positions through the recorded chain with [`Self::map_pos`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	changes: Vec<Operation>,
	len: usize,
	len_after: usize,
}

impl ChangeSet {
	/// Builds a changeset for a document of `doc_len` characters.
	///
	/// Edits must be sorted by position and must not overlap. Adjacent edits
	/// (one ending where the next starts) are allowed.
	pub fn from_edits(doc_len: CharLen, edits: &[Edit]) -> Result<Self, EditError> {
		let mut cs = ChangeSet::default();
		let mut pos = 0;

		for edit in edits {
			if edit.start > edit.end {
				return Err(EditError::Reversed {
					start: edit.start,
					end: edit.end,
				});
			}
			if edit.end > doc_len {
				return Err(EditError::OutOfBounds { end: edit.end, len: doc_len });
			}
			if edit.start < pos {
				return Err(EditError::Overlapping { at: edit.start });
			}

			cs.retain(edit.start - pos);
			cs.delete(edit.end - edit.start);
			cs.insert(edit.replacement.clone());
			pos = edit.end;
		}

		cs.retain(doc_len - pos);
		Ok(cs)
	}

	/// Returns the length of the source document (before changes).
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns the length of the document after applying changes.
	pub fn len_after(&self) -> usize {
		self.len_after
	}

	/// Returns true if this changeset leaves the document untouched.
	pub fn is_empty(&self) -> bool {
		self.changes.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	pub fn changes(&self) -> &[Operation] {
		&self.changes
	}

	fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Retain(n));
		}
	}

	fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Delete(n));
		}
	}

	/// Inserts before any trailing delete so `map_pos` sees inserts first.
	fn insert(&mut self, text: String) {
		if text.is_empty() {
			return;
		}

		let ins = Insertion::new(text);
		self.len_after += ins.char_len();

		match self.changes.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				prev.push_str(&ins);
			}
			[.., last @ Operation::Delete(_)] => {
				let del = std::mem::replace(last, Operation::Insert(ins));
				self.changes.push(del);
			}
			_ => {
				self.changes.push(Operation::Insert(ins));
			}
		}
	}

	/// Applies this changeset to a document, modifying it in place.
	pub fn apply(&self, doc: &mut Rope) {
		let mut pos = 0;
		for op in &self.changes {
			match op {
				Operation::Retain(n) => pos += n,
				Operation::Delete(n) => doc.remove(pos..pos + n),
				Operation::Insert(ins) => {
					doc.insert(pos, ins.text());
					pos += ins.char_len();
				}
			}
		}
	}

	/// Returns a new rope with this changeset applied.
	pub fn applied(&self, doc: &Rope) -> Rope {
		let mut next = doc.clone();
		self.apply(&mut next);
		next
	}

	/// Maps `pos` from the source document onto the changed one.
	///
	/// A position inside a deleted run lands where the run was. At an
	/// insertion point [`Bias::Left`] stays before the inserted text and
	/// [`Bias::Right`] moves past it.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let (mut from, mut to): (CharIdx, CharIdx) = (0, 0);
		for op in &self.changes {
			match op {
				Operation::Retain(n) if from + n > pos => return to + (pos - from),
				Operation::Retain(n) => {
					from += n;
					to += n;
				}
				Operation::Delete(n) if from + n > pos => return to,
				Operation::Delete(n) => from += n,
				Operation::Insert(_) if from == pos && bias == Bias::Left => {}
				Operation::Insert(ins) => to += ins.char_len(),
			}
		}
		to + (pos - from)
	}
}
