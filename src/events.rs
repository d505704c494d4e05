mod event_holder;

use crate::clock::{Hours, SimulationClock};
use crate::customer::CustomerId;
use crate::server_pool::SlotIndex;
use event_holder::EventHolder;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Something that happens at a point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub time: Hours,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// A customer walks into the bank. The work amount rides along so handling the arrival needs no lookup.
    Arrival { customer: CustomerId, work_amount: f64 },
    /// A server finishes with a customer, freeing `slot` unless someone is waiting.
    Completion {
        customer: CustomerId,
        slot: SlotIndex,
        started_at: Hours,
    },
}

impl Event {
    pub fn arrival(time: Hours, customer: CustomerId, work_amount: f64) -> Self {
        Self {
            time,
            kind: EventKind::Arrival { customer, work_amount },
        }
    }

    pub fn completion(time: Hours, customer: CustomerId, slot: SlotIndex, started_at: Hours) -> Self {
        Self {
            time,
            kind: EventKind::Completion {
                customer,
                slot,
                started_at,
            },
        }
    }

    pub fn customer(&self) -> CustomerId {
        match self.kind {
            EventKind::Arrival { customer, .. } | EventKind::Completion { customer, .. } => customer,
        }
    }

    pub fn is_arrival(&self) -> bool {
        matches!(self.kind, EventKind::Arrival { .. })
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let time = self.time.into_inner();
        match self.kind {
            EventKind::Arrival { customer, work_amount } => {
                write!(f, "[{time:.4}h] arrival of customer {customer} ({work_amount:.3} work units)")
            },
            EventKind::Completion {
                customer,
                slot,
                started_at,
            } => write!(
                f,
                "[{time:.4}h] completion of customer {customer} at window {slot} (started {:.4}h)",
                started_at.into_inner()
            ),
        }
    }
}

/// Priority queue of scheduled events.
///
/// Events come out in ascending order of time, with ties broken by the order in which they were pushed onto the
/// queue. The composite key makes the pop order a total order, so two runs fed the same events in the same order
/// process them identically.
///
/// The queue also owns the [`SimulationClock`]: popping an event moves the clock to that event's time.
///
/// # Errors
///
/// Pushing an event for a time earlier than the clock results in an [`Error::BackInTime`] without modifying the
/// queue. Popping from an empty queue results in an [`Error::EmptyQueue`].
///
/// [`Error::BackInTime`]: crate::Error::BackInTime
/// [`Error::EmptyQueue`]: crate::Error::EmptyQueue
#[derive(Debug, Default)]
pub struct EventQueue {
    events: BinaryHeap<Reverse<EventHolder>>,
    clock: SimulationClock,
    events_added: usize,
}

impl EventQueue {
    /// Construct a new [`EventQueue`] with no scheduled events and the clock at opening time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the provided event.
    ///
    /// # Errors
    ///
    /// If the event's time is less than the current clock time, returns an [`Error::BackInTime`] to indicate the
    /// likely presence of a logical bug at the call site, with no modifications to the queue.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn push(&mut self, event: Event) -> crate::Result {
        if event.time < self.clock.now() {
            return Err(crate::Error::BackInTime);
        }

        let count = self.increment_event_count();
        self.events.push(Reverse(EventHolder {
            event,
            insertion_sequence: count,
        }));
        Ok(())
    }

    /// Helper function to make sure incrementing the internal count of added events occurs the same way everywhere.
    fn increment_event_count(&mut self) -> usize {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    /// Remove and return the earliest event, moving the clock to its time.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyQueue`] if nothing is scheduled.
    ///
    /// [`Error::EmptyQueue`]: crate::Error::EmptyQueue
    pub fn pop_min(&mut self) -> crate::Result<Event> {
        let Reverse(holder) = self.events.pop().ok_or(crate::Error::EmptyQueue)?;
        self.clock.advance_to(holder.event.time)?;
        Ok(holder.event)
    }

    /// Time of the next event, if any.
    pub fn peek_time(&self) -> Option<Hours> {
        self.events.peek().map(|Reverse(holder)| holder.event.time)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// The time of the most recently popped event, or zero before the first pop.
    pub fn current_time(&self) -> Hours {
        self.clock.now()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }
}

impl std::fmt::Display for EventQueue {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "EventQueue with {} scheduled events at current time {}",
            self.events.len(),
            self.clock
        )
    }
}
