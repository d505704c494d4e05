use crate::customer::CustomerId;
use crate::events::Event;
use crate::metrics::Metrics;
use crate::server_pool::SlotIndex;

/// Errors that may be encountered while setting up or running a simulation.
///
/// [`InvalidConfig`] and [`InvalidCustomer`] originate from [`Simulation::new()`] and guarantee that no event has
/// been processed yet: a bad setup never produces a partial run.
///
/// [`EmptyQueue`] and [`BackInTime`] originate from the [`EventQueue`]. Neither can happen while the engine drives
/// the queue itself, so seeing one from [`Simulation::run()`] means a logic bug.
///
/// [`InvariantViolation`] is raised by the engine when its bookkeeping no longer adds up. It carries a snapshot of the
/// engine's state at the moment the check failed. The run cannot continue after one of these.
///
/// [`Simulation::new()`]: crate::Simulation::new
/// [`Simulation::run()`]: crate::Simulation::run
/// [`EventQueue`]: crate::EventQueue
/// [`InvalidConfig`]: Error::InvalidConfig
/// [`InvalidCustomer`]: Error::InvalidCustomer
/// [`EmptyQueue`]: Error::EmptyQueue
/// [`BackInTime`]: Error::BackInTime
/// [`InvariantViolation`]: Error::InvariantViolation
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The configuration was rejected before the run started.
    InvalidConfig(ConfigError),
    /// A pre-generated customer record cannot be simulated.
    InvalidCustomer {
        customer: CustomerId,
        reason: &'static str,
    },
    /// Tried to pop from an event queue with nothing scheduled.
    EmptyQueue,
    /// The event queue rejected an event that would have been scheduled for a time that has already passed.
    BackInTime,
    /// The engine's internal state is inconsistent. Unpack the boxed value for diagnostics.
    InvariantViolation(Box<InvariantViolation>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(e) => write!(f, "invalid configuration: {e}"),
            Self::InvalidCustomer { customer, reason } => write!(f, "invalid customer {customer}: {reason}"),
            Self::EmptyQueue => write!(f, "no events left to pop from the event queue"),
            Self::BackInTime => write!(f, "event execution time is less than current simulation time"),
            Self::InvariantViolation(v) => write!(f, "internal invariant violated: {v}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

/// A configuration value outside of its allowed range. NaN and infinity count as out of range for the real-valued
/// fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    NoServers,
    NoCustomers,
    NonPositiveServiceRate(f64),
    NonPositiveWindow(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NoServers => write!(f, "number of servers must be positive"),
            Self::NoCustomers => write!(f, "number of customers must be positive"),
            Self::NonPositiveServiceRate(rate) => write!(f, "service rate must be positive and finite, got {rate}"),
            Self::NonPositiveWindow(length) => write!(f, "operating window must be positive and finite, got {length} hours"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The rule the engine found broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// A slot was set busy while already busy.
    DoubleAssignment(SlotIndex),
    /// A slot was freed while already idle.
    DoubleRelease(SlotIndex),
    /// An event refers to a slot outside the pool.
    UnknownSlot(SlotIndex),
    /// More busy slots than servers, or idle + busy no longer equals the pool size.
    SlotConservation,
    /// A customer was waiting while a slot sat idle during opening hours.
    IdleWhileWaiting(SlotIndex),
    /// An event refers to a customer the registry does not know.
    UnknownCustomer(CustomerId),
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::DoubleAssignment(slot) => write!(f, "slot {slot} assigned while already busy"),
            Self::DoubleRelease(slot) => write!(f, "slot {slot} released while already idle"),
            Self::UnknownSlot(slot) => write!(f, "slot {slot} does not exist"),
            Self::SlotConservation => write!(f, "idle and busy slots do not add up to the pool size"),
            Self::IdleWhileWaiting(slot) => write!(f, "slot {slot} idle while customers are waiting"),
            Self::UnknownCustomer(id) => write!(f, "event refers to unknown customer {id}"),
        }
    }
}

/// Engine state captured at the moment a [`Rule`] was found broken.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub clock: f64,
    pub event: Option<Event>,
    pub busy_slots: Vec<SlotIndex>,
    pub num_servers: usize,
    pub waiting: usize,
    pub pending_events: usize,
    pub metrics: Metrics,
}

/// A broken [`Rule`] together with the [`StateSnapshot`] needed to debug it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantViolation {
    pub rule: Rule,
    pub state: StateSnapshot,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let state = &self.state;
        write!(
            f,
            "{} (clock {:.6}h, event {:?}, busy slots {:?} of {}, {} waiting, {} pending events, {} served, {:.6}h total wait)",
            self.rule,
            state.clock,
            state.event,
            state.busy_slots,
            state.num_servers,
            state.waiting,
            state.pending_events,
            state.metrics.customers_served,
            state.metrics.total_wait_time,
        )
    }
}

/// [`std::result::Result`]`<T, `[`teller::Error`]`>`, defaulting to `T = ()`.
///
/// [`teller::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;
