//! Tag scanners feeding the reader role.

use std::collections::VecDeque;

use crate::protocol::TagId;

/// Non-blocking view of the RFID reader hardware: at any scan there either
/// is a tag under the antenna or there is not.
pub trait TagScanner {
    fn try_read(&mut self) -> Option<TagId>;
}

/// Replays a queued sequence of tags, one per call. Stands in for the
/// hardware in tests and the demo.
#[derive(Debug, Default)]
pub struct ScriptedScanner {
    pending: VecDeque<TagId>,
}

impl ScriptedScanner {
    pub fn new(tags: impl IntoIterator<Item = TagId>) -> Self {
        Self {
            pending: tags.into_iter().collect(),
        }
    }

    pub fn push(&mut self, tag: TagId) {
        self.pending.push_back(tag);
    }
}

impl TagScanner for ScriptedScanner {
    fn try_read(&mut self) -> Option<TagId> {
        self.pending.pop_front()
    }
}
