/// Position of a service window in the [`ServerPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(pub usize);

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Idle,
    Busy,
}

/// Why a slot transition was refused. The engine turns these into invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    AlreadyBusy(SlotIndex),
    AlreadyIdle(SlotIndex),
    OutOfRange(SlotIndex),
}

/// A fixed number of service windows, each idle or busy.
///
/// Idle slots are handed out lowest index first, so the same sequence of requests always lands on the same windows.
#[derive(Debug, Clone)]
pub struct ServerPool {
    slots: Vec<SlotState>,
    busy: usize,
}

impl ServerPool {
    /// A pool of `size` idle slots.
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![SlotState::Idle; size],
            busy: 0,
        }
    }

    /// The lowest-index idle slot, or `None` when every slot is busy.
    pub fn find_idle(&self) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|state| *state == SlotState::Idle)
            .map(SlotIndex)
    }

    pub fn set_busy(&mut self, slot: SlotIndex) -> Result<(), SlotError> {
        match self.slots.get_mut(slot.0) {
            None => Err(SlotError::OutOfRange(slot)),
            Some(SlotState::Busy) => Err(SlotError::AlreadyBusy(slot)),
            Some(state) => {
                *state = SlotState::Busy;
                self.busy += 1;
                Ok(())
            },
        }
    }

    pub fn set_idle(&mut self, slot: SlotIndex) -> Result<(), SlotError> {
        match self.slots.get_mut(slot.0) {
            None => Err(SlotError::OutOfRange(slot)),
            Some(SlotState::Idle) => Err(SlotError::AlreadyIdle(slot)),
            Some(state) => {
                *state = SlotState::Idle;
                self.busy -= 1;
                Ok(())
            },
        }
    }

    pub fn state(&self, slot: SlotIndex) -> Option<SlotState> {
        self.slots.get(slot.0).copied()
    }

    pub fn busy_count(&self) -> usize {
        self.busy
    }

    pub fn idle_count(&self) -> usize {
        self.slots.len() - self.busy
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Indices of the busy slots, ascending.
    pub fn busy_slots(&self) -> Vec<SlotIndex> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == SlotState::Busy)
            .map(|(index, _)| SlotIndex(index))
            .collect()
    }

    /// Recount the slots and compare against the running busy counter.
    pub(crate) fn is_consistent(&self) -> bool {
        let counted = self.slots.iter().filter(|state| **state == SlotState::Busy).count();
        counted == self.busy && self.busy <= self.slots.len()
    }
}
