/// Issues player ids from a counter that only moves forward.
///
/// Every id the store has seen is observed, so an issued id is always
/// greater than any numeric id already present, and a deleted id is never
/// handed out again for the lifetime of the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    /// Account for an existing id. Non-numeric ids cannot collide with
    /// issued ones and are ignored, as is `u64::MAX`, which is never issued.
    pub fn observe(&mut self, id: &str) {
        if let Ok(n) = id.parse::<u64>() {
            if let Some(next) = n.checked_add(1) {
                self.next = self.next.max(next);
            }
        }
    }

    /// The next id, or `None` once the counter is exhausted.
    pub fn issue(&mut self) -> Option<String> {
        let id = self.next;
        self.next = self.next.checked_add(1)?;
        Some(id.to_string())
    }
}
