//! Navigation state for the record inspector.
//!
//! The current index is explicit state owned by the rendering session and
//! passed through the navigation handlers, never ambient global state. The
//! index is clamped to the valid record range regardless of how navigation
//! inputs are interleaved.

/// Step-through position over a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerState {
    index: usize,
    len: usize,
}

impl ViewerState {
    /// Start at the first record. `len` must be non-zero; the caller is
    /// expected to render an error state for an empty table instead of
    /// constructing a session over it.
    pub fn new(len: usize) -> Option<Self> {
        if len == 0 {
            None
        } else {
            Some(Self { index: 0, len })
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Move to the next record, saturating at the last one.
    pub fn next(&mut self) {
        if self.index + 1 < self.len {
            self.index += 1;
        }
    }

    /// Move to the previous record, saturating at the first one.
    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn at_start(&self) -> bool {
        self.index == 0
    }

    pub fn at_end(&self) -> bool {
        self.index + 1 == self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_has_no_session() {
        assert_eq!(ViewerState::new(0), None);
    }

    #[test]
    fn test_repeated_prev_clamps_at_zero() {
        let mut state = ViewerState::new(3).unwrap();
        for _ in 0..10 {
            state.prev();
        }
        assert_eq!(state.index(), 0);
        assert!(state.at_start());
    }

    #[test]
    fn test_repeated_next_clamps_at_last() {
        let mut state = ViewerState::new(3).unwrap();
        for _ in 0..10 {
            state.next();
        }
        assert_eq!(state.index(), 2);
        assert!(state.at_end());
    }

    #[test]
    fn test_interleaved_navigation_stays_in_range() {
        let mut state = ViewerState::new(5).unwrap();
        let moves = [1, 1, -1, 1, 1, 1, 1, -1, -1, -1, -1, -1, 1];
        for step in moves {
            if step > 0 {
                state.next();
            } else {
                state.prev();
            }
            assert!(state.index() < state.len());
        }
    }

    #[test]
    fn test_single_record_is_both_ends() {
        let mut state = ViewerState::new(1).unwrap();
        assert!(state.at_start() && state.at_end());
        state.next();
        state.prev();
        assert_eq!(state.index(), 0);
    }
}
