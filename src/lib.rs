//! # Overview
//!
//! teller simulates one business day at a bank with several service windows. Customers walk in at random times,
//! each needing a random amount of work done. A customer who finds a window idle is served at once; everyone else
//! waits in a single first-come, first-served line. The day ends at closing time, after which nobody new is admitted
//! and no new service starts, but customers already at a window are seen through to the end.
//!
//! The simulation is discrete-event: the clock jumps from one event to the next instead of ticking in fixed steps.
//! There are two kinds of [`Event`]:
//!
//! * an arrival, scheduled once per customer before the day starts, and
//! * a completion, scheduled whenever a window starts serving someone.
//!
//! Events come out of the [`EventQueue`] ordered by time, with simultaneous events ordered by when they were
//! scheduled. Together with lowest-index window assignment this makes a run fully reproducible: the same customers
//! and configuration always produce the same sequence of events and the same [`Report`].
//!
//! # Example
//!
//! ```
//! use teller::{Config, Simulation};
//!
//! let config = Config {
//!     num_servers: 2,
//!     service_rate: 10.0,
//!     num_customers: 20,
//!     operating_window_hours: 8.0,
//! };
//! let mut sim = Simulation::seeded(config, 42)?;
//! let report = sim.run()?;
//! assert!(report.customers_served <= 20);
//! # Ok::<(), teller::Error>(())
//! ```
//!
//! Customers can also be supplied directly with [`Simulation::new()`], or drawn from any [`SampleSource`] with
//! [`Simulation::from_source()`].

mod clock;
mod config;
mod customer;
mod error;
mod events;
mod metrics;
mod sampling;
mod server_pool;
mod simulation;
mod waiting_queue;

pub use clock::{hours, Hours, SimulationClock};
pub use config::{Config, Scenario};
pub use customer::{Customer, CustomerId, CustomerRegistry};
pub use error::{ConfigError, Error, InvariantViolation, Result, Rule, StateSnapshot};
pub use events::{Event, EventKind, EventQueue};
pub use metrics::{AverageWait, Metrics, Report};
pub use sampling::{generate_customers, BankSampler, SampleSource, TruncatedNormal};
pub use server_pool::{ServerPool, SlotError, SlotIndex, SlotState};
pub use simulation::Simulation;
pub use waiting_queue::{WaitingEntry, WaitingQueue};
