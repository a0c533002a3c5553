use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history: offset {offset} out of range ({retained} entries)")]
    OutOfRange { offset: usize, retained: usize },
}

/// Fixed-capacity ring of submitted lines.
///
/// Until the cursor wraps for the first time the chronological order is
/// `[0, next)`. Afterwards it is `[next, capacity) ++ [0, next)`, so the
/// oldest retained line always sits at the cursor.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    slots: Vec<Option<String>>,
    next: usize,
    full: bool,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HistoryStore {
    /// A zero capacity is bumped to one so the cursor arithmetic stays defined.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            next: 0,
            full: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            self.next
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn record(&mut self, line: impl Into<String>) {
        // replacing the slot drops whatever line was there before
        self.slots[self.next] = Some(line.into());
        self.next = (self.next + 1) % self.capacity();
        if self.next == 0 {
            self.full = true;
        }
    }

    pub fn resolve(&self, offset: usize) -> Result<&str, HistoryError> {
        let retained = self.len();
        if offset >= retained {
            return Err(HistoryError::OutOfRange { offset, retained });
        }

        self.slots[self.physical(offset)]
            .as_deref()
            .ok_or(HistoryError::OutOfRange { offset, retained })
    }

    pub fn list(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        (0..self.len()).filter_map(|index| {
            self.slots[self.physical(index)]
                .as_deref()
                .map(|line| (index, line))
        })
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.next = 0;
        self.full = false;
    }

    fn physical(&self, index: usize) -> usize {
        if self.full {
            (self.next + index) % self.capacity()
        } else {
            index
        }
    }
}
