use super::Event;
use std::cmp::Ordering;

/// Helper struct for the event queue. Holds the event alongside the record of its insertion sequence, which together
/// with the event's time forms the queue's sort key.
///
/// The implementation of [`Ord`] on this struct compares execution times first and only looks at the insertion
/// sequences to break ties, so events sharing a timestamp come out in the order they went in.
#[derive(Debug)]
pub(super) struct EventHolder {
    pub event: Event,
    pub insertion_sequence: usize,
}

impl PartialEq<Self> for EventHolder {
    fn eq(&self, other: &Self) -> bool {
        self.insertion_sequence == other.insertion_sequence && self.event.time == other.event.time
    }
}

impl Eq for EventHolder {}

impl PartialOrd<Self> for EventHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        let comparison = self.event.time.cmp(&other.event.time);
        match comparison {
            Ordering::Equal => self.insertion_sequence.cmp(&other.insertion_sequence),
            _ => comparison,
        }
    }
}
