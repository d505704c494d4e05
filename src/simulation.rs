use crate::clock::Hours;
use crate::config::Config;
use crate::customer::{Customer, CustomerId, CustomerRegistry};
use crate::error::{InvariantViolation, Rule, StateSnapshot};
use crate::events::{Event, EventKind, EventQueue};
use crate::metrics::{Metrics, Report};
use crate::sampling::{generate_customers, BankSampler, SampleSource};
use crate::server_pool::{ServerPool, SlotError, SlotIndex, SlotState};
use crate::waiting_queue::WaitingQueue;
use crate::Error;

use log::{debug, error, info};

/// One business day at the bank.
///
/// A [`Simulation`] exclusively owns its event queue, its windows, its waiting line and the customer registry, and
/// mutates them one event at a time. The expected workflow is:
///
/// 1. Build a [`Config`] and either a list of [`Customer`]s or a [`SampleSource`].
/// 2. Pass them to [`new()`] or [`from_source()`]. One arrival event is scheduled per customer.
/// 3. Call [`run()`] and present the returned [`Report`], or drive the day by hand with [`step()`].
///
/// Events are handled as follows:
///
/// * An arrival at or after closing is dropped and counted as turned away. Otherwise the customer takes the
///   lowest-index idle window, or joins the back of the line if every window is busy.
/// * A completion always counts the customer as served, even after closing. While the bank is open, the freed window
///   goes straight to the front of the line; after closing, or with nobody in line, the window goes idle.
///
/// Nothing ends the day early: once the last arrival has been handled the queue only holds completions, which are
/// drained so work already in progress at closing runs to the end.
///
/// [`new()`]: Simulation::new
/// [`from_source()`]: Simulation::from_source
/// [`run()`]: Simulation::run
/// [`step()`]: Simulation::step
#[derive(Debug)]
pub struct Simulation {
    config: Config,
    event_queue: EventQueue,
    servers: ServerPool,
    waiting: WaitingQueue,
    customers: CustomerRegistry,
    metrics: Metrics,
    /// Set once an invariant breaks; every later step returns it again.
    halted: Option<Error>,
}

impl Simulation {
    /// Set up a day for the given customers, scheduling their arrivals in the order given.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] or [`Error::InvalidCustomer`]. Nothing is scheduled when either is returned.
    pub fn new(config: Config, customers: Vec<Customer>) -> crate::Result<Self> {
        config.validate()?;

        let arrivals: Vec<Event> = customers
            .iter()
            .map(|customer| Event::arrival(customer.arrival_time, customer.id, customer.work_amount))
            .collect();
        let customers = CustomerRegistry::new(customers)?;

        let mut event_queue = EventQueue::new();
        for arrival in arrivals {
            event_queue.push(arrival)?;
        }

        Ok(Self {
            config,
            event_queue,
            servers: ServerPool::new(config.num_servers),
            waiting: WaitingQueue::new(),
            customers,
            metrics: Metrics::default(),
            halted: None,
        })
    }

    /// Draw `config.num_customers` customers from `source`, then set up the day as in [`new()`].
    ///
    /// # Errors
    ///
    /// As for [`new()`]. The configuration is checked before the source is touched.
    ///
    /// [`new()`]: Simulation::new
    pub fn from_source<S>(config: Config, source: &mut S) -> crate::Result<Self>
    where
        S: SampleSource + ?Sized,
    {
        config.validate()?;
        let customers = generate_customers(config.num_customers, source)?;
        Self::new(config, customers)
    }

    /// Shorthand for [`from_source()`] with a [`BankSampler`] seeded from `seed`.
    ///
    /// # Errors
    ///
    /// As for [`new()`].
    ///
    /// [`from_source()`]: Simulation::from_source
    /// [`new()`]: Simulation::new
    pub fn seeded(config: Config, seed: u64) -> crate::Result<Self> {
        config.validate()?;
        let mut sampler = BankSampler::seeded(seed, config.operating_window_hours);
        Self::from_source(config, &mut sampler)
    }

    /// Handle every remaining event, then summarize the day.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] if the engine's bookkeeping breaks. The run stops at the offending event.
    pub fn run(&mut self) -> crate::Result<Report> {
        info!(
            "Opening {} windows for {} customers over {} hours",
            self.servers.len(),
            self.customers.len(),
            self.config.operating_window_hours
        );

        while self.step()?.is_some() {}

        let report = self.report();
        info!(
            "Day over at {:.4}h: served {}/{}, average wait {}",
            report.final_time, report.customers_served, report.customers_generated, report.average_wait
        );
        Ok(report)
    }

    /// Pop and handle the next event, returning it. Returns `Ok(None)` once no events remain.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] if handling the event left the engine inconsistent. Every later call returns the
    /// same error.
    pub fn step(&mut self) -> crate::Result<Option<Event>> {
        if let Some(halted) = &self.halted {
            return Err(halted.clone());
        }
        if self.event_queue.is_empty() {
            return Ok(None);
        }

        let event = self.event_queue.pop_min()?;
        let outcome = match event.kind {
            EventKind::Arrival { customer, work_amount } => self.handle_arrival(&event, customer, work_amount),
            EventKind::Completion {
                customer,
                slot,
                started_at,
            } => self.handle_completion(&event, customer, slot, started_at),
        }
        .and_then(|()| self.check_conservation(&event));

        match outcome {
            Ok(()) => Ok(Some(event)),
            Err(e) => {
                error!("Aborting run: {e}");
                self.halted = Some(e.clone());
                Err(e)
            },
        }
    }

    fn handle_arrival(&mut self, event: &Event, customer: CustomerId, work_amount: f64) -> crate::Result {
        let now = event.time;
        if !self.config.is_open_at(now.into_inner()) {
            debug!("{event}: bank is closed, customer turned away");
            self.metrics.record_turned_away();
            return Ok(());
        }

        match self.servers.find_idle() {
            Some(slot) => {
                if !self.waiting.is_empty() {
                    return Err(self.violation(Rule::IdleWhileWaiting(slot), event));
                }
                debug!("{event}: served immediately at window {slot}");
                self.start_service(event, customer, work_amount, slot, now, true)
            },
            None => {
                debug!("{event}: all windows busy, {} already in line", self.waiting.len());
                self.waiting.enqueue(customer, now);
                Ok(())
            },
        }
    }

    fn handle_completion(
        &mut self,
        event: &Event,
        customer: CustomerId,
        slot: SlotIndex,
        started_at: Hours,
    ) -> crate::Result {
        let now = event.time;
        self.metrics.record_completion();
        debug!(
            "{event}: customer {customer} done after {:.4}h at the window",
            (now - started_at).into_inner()
        );

        if !self.waiting.is_empty() && !self.config.is_open_at(now.into_inner()) {
            debug!(
                "Window {slot} closing for the day, {} customers left in line",
                self.waiting.len()
            );
            return self.release(event, slot);
        }

        let Some(next) = self.waiting.dequeue() else {
            debug!("Window {slot} idle, nobody in line");
            return self.release(event, slot);
        };
        let work_amount = match self.customers.get(next.customer) {
            Some(record) => record.work_amount,
            None => return Err(self.violation(Rule::UnknownCustomer(next.customer), event)),
        };
        let wait = (now - next.arrival_time).into_inner();
        self.metrics.record_wait(wait);
        debug!(
            "Window {slot} takes customer {} after {wait:.4}h in line, {} still waiting",
            next.customer,
            self.waiting.len()
        );

        // the window passes straight to the next customer without going idle in between
        self.start_service(event, next.customer, work_amount, slot, now, false)
    }

    /// Mark `slot` as serving `customer` from `now` and schedule the matching completion. A slot handed over by a
    /// completion is still busy, so `acquire` is false for those.
    fn start_service(
        &mut self,
        event: &Event,
        customer: CustomerId,
        work_amount: f64,
        slot: SlotIndex,
        now: Hours,
        acquire: bool,
    ) -> crate::Result {
        if acquire {
            if let Err(e) = self.servers.set_busy(slot) {
                return Err(self.slot_violation(e, event));
            }
        } else {
            match self.servers.state(slot) {
                Some(SlotState::Busy) => {},
                Some(SlotState::Idle) => return Err(self.violation(Rule::DoubleRelease(slot), event)),
                None => return Err(self.violation(Rule::UnknownSlot(slot), event)),
            }
        }

        let completion_time = now + work_amount / self.config.service_rate;
        debug!(
            "Customer {customer} will be done at {:.4}h",
            completion_time.into_inner()
        );
        self.event_queue
            .push(Event::completion(completion_time, customer, slot, now))
    }

    fn release(&mut self, event: &Event, slot: SlotIndex) -> crate::Result {
        self.servers
            .set_idle(slot)
            .map_err(|e| self.slot_violation(e, event))
    }

    fn check_conservation(&self, event: &Event) -> crate::Result {
        let pool = &self.servers;
        if pool.is_consistent() && pool.idle_count() + pool.busy_count() == pool.len() {
            Ok(())
        } else {
            Err(self.violation(Rule::SlotConservation, event))
        }
    }

    fn slot_violation(&self, e: SlotError, event: &Event) -> Error {
        let rule = match e {
            SlotError::AlreadyBusy(slot) => Rule::DoubleAssignment(slot),
            SlotError::AlreadyIdle(slot) => Rule::DoubleRelease(slot),
            SlotError::OutOfRange(slot) => Rule::UnknownSlot(slot),
        };
        self.violation(rule, event)
    }

    fn violation(&self, rule: Rule, event: &Event) -> Error {
        Error::InvariantViolation(Box::new(InvariantViolation {
            rule,
            state: StateSnapshot {
                clock: self.event_queue.current_time().into_inner(),
                event: Some(*event),
                busy_slots: self.servers.busy_slots(),
                num_servers: self.servers.len(),
                waiting: self.waiting.len(),
                pending_events: self.event_queue.len(),
                metrics: self.metrics,
            },
        }))
    }

    /// Summary of the day so far. After [`run()`] returns, this is the final report.
    ///
    /// [`run()`]: Simulation::run
    pub fn report(&self) -> Report {
        Report {
            customers_generated: self.customers.len(),
            customers_served: self.metrics.customers_served,
            customers_turned_away: self.metrics.customers_turned_away,
            customers_unserved: self.waiting.len(),
            total_wait_time: self.metrics.total_wait_time,
            average_wait: self.metrics.average_wait(),
            final_time: self.event_queue.current_time().into_inner(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Time of the most recently handled event.
    pub fn clock(&self) -> Hours {
        self.event_queue.current_time()
    }

    pub fn event_queue(&self) -> &EventQueue {
        &self.event_queue
    }

    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    pub fn server_pool(&self) -> &ServerPool {
        &self.servers
    }

    pub fn waiting_queue(&self) -> &WaitingQueue {
        &self.waiting
    }

    pub fn customers(&self) -> &CustomerRegistry {
        &self.customers
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl std::fmt::Display for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Simulation at time {} with {}/{} windows busy and {} waiting",
            self.event_queue.clock(),
            self.servers.busy_count(),
            self.servers.len(),
            self.waiting.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::hours;

    fn h(value: f64) -> Hours {
        hours(value).unwrap()
    }

    fn customer(id: usize, arrival_time: f64, work_amount: f64) -> Customer {
        Customer {
            id: CustomerId(id),
            work_amount,
            arrival_time: h(arrival_time),
        }
    }

    fn config(num_servers: usize) -> Config {
        Config {
            num_servers,
            service_rate: 10.0,
            num_customers: 1,
            operating_window_hours: 8.0,
        }
    }

    fn rule_of(result: crate::Result<Option<Event>>) -> Rule {
        match result {
            Err(Error::InvariantViolation(violation)) => violation.rule,
            other => panic!("expected an invariant violation, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_schedules_nothing() {
        let result = Simulation::new(config(0), vec![customer(0, 1.0, 5.0)]);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn one_arrival_per_customer_is_scheduled() {
        let sim = Simulation::new(config(2), vec![customer(0, 1.0, 5.0), customer(1, 0.5, 5.0)]).unwrap();
        assert_eq!(2, sim.pending_events());
        assert_eq!(Some(h(0.5)), sim.event_queue().peek_time());
        assert_eq!(h(0.0), sim.clock());
    }

    #[test]
    fn completion_for_an_idle_window_halts_the_run() {
        let mut sim = Simulation::new(config(1), vec![customer(0, 1.0, 5.0)]).unwrap();
        sim.event_queue
            .push(Event::completion(h(0.5), CustomerId(0), SlotIndex(0), h(0.0)))
            .unwrap();

        let first = sim.step();
        assert_eq!(Rule::DoubleRelease(SlotIndex(0)), rule_of(first.clone()));
        assert_eq!(first, sim.step(), "a halted run should keep reporting the same violation");
    }

    #[test]
    fn idle_window_with_people_in_line_is_caught() {
        let mut sim = Simulation::new(config(1), vec![customer(0, 1.0, 5.0)]).unwrap();
        sim.waiting.enqueue(CustomerId(0), h(0.2));

        let violation = match sim.step() {
            Err(Error::InvariantViolation(violation)) => violation,
            other => panic!("expected an invariant violation, got {other:?}"),
        };
        assert_eq!(Rule::IdleWhileWaiting(SlotIndex(0)), violation.rule);
        assert_eq!(1.0, violation.state.clock);
        assert_eq!(1, violation.state.waiting);
        assert!(violation.state.busy_slots.is_empty());
    }

    #[test]
    fn unknown_customer_in_line_is_caught() {
        let mut sim = Simulation::new(config(1), vec![customer(0, 0.0, 5.0)]).unwrap();
        sim.step().unwrap();
        sim.waiting.enqueue(CustomerId(42), h(0.1));

        assert_eq!(Rule::UnknownCustomer(CustomerId(42)), rule_of(sim.step()));
    }

    #[test]
    fn completion_for_a_missing_window_is_caught() {
        let mut sim = Simulation::new(config(1), vec![customer(0, 1.0, 5.0)]).unwrap();
        sim.event_queue
            .push(Event::completion(h(0.5), CustomerId(0), SlotIndex(3), h(0.0)))
            .unwrap();

        assert_eq!(Rule::UnknownSlot(SlotIndex(3)), rule_of(sim.step()));
    }

    #[test]
    fn display_summarizes_state() {
        let mut sim = Simulation::new(config(2), vec![customer(0, 0.25, 5.0)]).unwrap();
        sim.step().unwrap();
        assert_eq!(
            "Simulation at time t=0.2500h with 1/2 windows busy and 0 waiting",
            sim.to_string()
        );
    }
}
