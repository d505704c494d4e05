use crate::clock::Hours;
use crate::customer::CustomerId;

use std::collections::VecDeque;

/// A customer standing in line, and when they got there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitingEntry {
    pub customer: CustomerId,
    pub arrival_time: Hours,
}

/// Customers who arrived to find every window busy, served strictly first come, first served.
#[derive(Debug, Clone, Default)]
pub struct WaitingQueue {
    entries: VecDeque<WaitingEntry>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, customer: CustomerId, arrival_time: Hours) {
        self.entries.push_back(WaitingEntry { customer, arrival_time });
    }

    /// Remove the customer who has been in line longest.
    pub fn dequeue(&mut self) -> Option<WaitingEntry> {
        self.entries.pop_front()
    }

    pub fn front(&self) -> Option<&WaitingEntry> {
        self.entries.front()
    }

    pub fn contains(&self, customer: CustomerId) -> bool {
        self.entries.iter().any(|entry| entry.customer == customer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaitingEntry> {
        self.entries.iter()
    }
}
