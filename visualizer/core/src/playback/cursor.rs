//! Cursor over a precomputed event sequence.

use crate::generators::SortEvent;

/// Position inside a finite event sequence
///
/// The position is always in `0..=len`. Moving back does not undo anything;
/// it only moves the position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventCursor {
    events: Vec<SortEvent>,
    position: usize,
}

impl EventCursor {
    /// Cursor at the start of `events`
    #[must_use]
    pub fn new(events: Vec<SortEvent>) -> Self {
        Self {
            events,
            position: 0,
        }
    }

    /// Index of the next event to apply
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the sequence has no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether every event has been applied
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.events.len()
    }

    /// Take the event at the cursor and move past it
    pub fn advance(&mut self) -> Option<SortEvent> {
        let event = self.events.get(self.position).copied()?;
        self.position += 1;
        Some(event)
    }

    /// Move back one position; false at the start
    pub fn retreat(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_bounds() {
        let mut cursor = EventCursor::new(vec![
            SortEvent::Compare { i: 0, j: 1 },
            SortEvent::SortedMarked { index: 0 },
        ]);
        assert!(!cursor.retreat());
        assert_eq!(cursor.advance(), Some(SortEvent::Compare { i: 0, j: 1 }));
        assert!(cursor.advance().is_some());
        assert!(cursor.is_finished());

        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.position(), 2);

        assert!(cursor.retreat());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_empty_cursor_is_finished() {
        let cursor = EventCursor::new(Vec::new());
        assert!(cursor.is_empty());
        assert!(cursor.is_finished());
    }
}
