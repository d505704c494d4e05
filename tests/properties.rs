mod util;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use teller::*;

/// Random customers whose arrival times sit on a coarse grid so that ties are common, with some arriving after
/// closing.
fn random_customers(rng: &mut Pcg64, count: usize, window: f64) -> Vec<Customer> {
    (0..count)
        .map(|id| {
            let slot: u32 = rng.random_range(0..=(window as u32 * 4 + 4));
            let work_amount = f64::from(rng.random_range(1u32..=20));
            Customer {
                id: CustomerId(id),
                work_amount,
                arrival_time: hours(f64::from(slot) * 0.25).expect("grid times are never NaN"),
            }
        })
        .collect()
}

fn random_config(rng: &mut Pcg64, num_customers: usize) -> Config {
    Config {
        num_servers: rng.random_range(1..=4),
        service_rate: f64::from(rng.random_range(2u32..=20)),
        num_customers,
        operating_window_hours: 8.0,
    }
}

/// Check every invariant that should hold between events.
fn assert_consistent(sim: &Simulation) {
    let pool = sim.server_pool();
    assert_eq!(pool.len(), pool.idle_count() + pool.busy_count(), "slots not conserved");
    assert!(pool.busy_count() <= pool.len(), "more busy slots than servers");

    let now = sim.clock();
    let waiting: Vec<&WaitingEntry> = sim.waiting_queue().iter().collect();
    for entry in &waiting {
        assert!(entry.arrival_time <= now, "customer waiting before arriving");
        assert!(
            sim.config().is_open_at(entry.arrival_time.into_inner()),
            "customer admitted after closing"
        );
    }
    assert!(
        waiting.windows(2).all(|pair| pair[0].arrival_time <= pair[1].arrival_time),
        "line is not in arrival order"
    );

    if sim.config().is_open_at(now.into_inner()) && !waiting.is_empty() {
        assert_eq!(None, pool.find_idle(), "idle window while customers wait during opening hours");
    }
}

#[test]
fn invariants_hold_across_random_days() {
    let mut rng = Pcg64::seed_from_u64(0x7e11e5);
    for _ in 0..200 {
        let num_customers = rng.random_range(1..=60);
        let config = random_config(&mut rng, num_customers);
        let customers = random_customers(&mut rng, num_customers, config.operating_window_hours);
        let mut sim = Simulation::new(config, customers).expect("random setup should be valid");

        let mut last_time = sim.clock();
        let mut last_wait = 0.0;
        while let Some(event) = sim.step().expect("engine should never break its own invariants") {
            assert!(event.time >= last_time, "clock moved backwards");
            last_time = event.time;

            let total_wait = sim.metrics().total_wait_time;
            assert!(total_wait >= last_wait, "negative wait recorded");
            last_wait = total_wait;

            if let EventKind::Completion { started_at, .. } = event.kind {
                assert!(
                    sim.config().is_open_at(started_at.into_inner()),
                    "service started after closing"
                );
            }
            assert_consistent(&sim);
        }

        let report = sim.report();
        assert_eq!(0, sim.server_pool().busy_count(), "windows still busy after the last event");
        assert_eq!(
            report.customers_generated,
            report.customers_served + report.customers_turned_away + report.customers_unserved,
            "customers lost track of"
        );
    }
}

#[test]
fn same_customers_same_day() {
    let mut rng = Pcg64::seed_from_u64(2024);
    for _ in 0..20 {
        let num_customers = rng.random_range(1..=80);
        let config = random_config(&mut rng, num_customers);
        let customers = random_customers(&mut rng, num_customers, config.operating_window_hours);

        let trace = |customers: Vec<Customer>| {
            let mut sim = Simulation::new(config, customers).unwrap();
            let mut events = Vec::new();
            while let Some(event) = sim.step().unwrap() {
                events.push(event);
            }
            (events, sim.report())
        };

        let (first_events, first_report) = trace(customers.clone());
        let (second_events, second_report) = trace(customers);
        assert_eq!(first_events, second_events, "event sequences diverged");
        assert_eq!(first_report, second_report, "reports diverged");
        assert_eq!(
            first_report.total_wait_time.to_bits(),
            second_report.total_wait_time.to_bits(),
            "total wait is not bit-identical"
        );
    }
}

#[test]
fn same_seed_same_report() {
    let config = Scenario::Default.config();
    let first = Simulation::seeded(config, 11434450237083315284).unwrap().run().unwrap();
    let second = Simulation::seeded(config, 11434450237083315284).unwrap().run().unwrap();
    assert_eq!(first, second);
}

#[test]
fn default_day_serves_most_customers() {
    let config = Scenario::Default.config();
    let report = Simulation::seeded(config, 7082446179938253086).unwrap().run().unwrap();

    assert_eq!(160, report.customers_generated);
    assert_eq!(0, report.customers_turned_away, "sampled arrivals always fall inside the window");
    assert_eq!(
        160,
        report.customers_served + report.customers_unserved,
        "customers lost track of"
    );
    // twenty customers an hour at ~0.54h each is slightly more than ten windows can take, so a line builds up
    assert!(report.customers_served >= 120, "only {} served", report.customers_served);
    assert!(report.customers_unserved > 0, "expected a line left at closing");
    let average = report.average_wait.hours().expect("somebody was served");
    assert!(average > 0.0 && average < 2.0, "average wait {average} out of range");
}

#[test]
fn small_day_accounts_for_everyone() {
    let config = Scenario::Small.config();
    let report = Simulation::seeded(config, 13009076887838060007).unwrap().run().unwrap();

    // only customers arriving in the last minutes can miss out
    assert_eq!(10, report.customers_generated);
    assert_eq!(report.customers_generated, report.customers_served + report.customers_unserved);
    assert!(report.customers_served >= 6, "only {} served", report.customers_served);
}

#[test]
fn custom_sample_source_drives_generation() {
    struct Fixed {
        next_arrival: f64,
    }

    impl SampleSource for Fixed {
        fn sample_arrival_time(&mut self) -> f64 {
            let arrival = self.next_arrival;
            self.next_arrival += 1.0;
            arrival
        }

        fn sample_work_amount(&mut self) -> f64 {
            5.0
        }
    }

    let config = Config {
        num_servers: 1,
        service_rate: 10.0,
        num_customers: 10,
        operating_window_hours: 8.0,
    };
    let report = Simulation::from_source(config, &mut Fixed { next_arrival: 0.0 })
        .unwrap()
        .run()
        .unwrap();

    // arrivals at 0..=9 hours, half an hour each; the ones at 8h and 9h come at or after closing
    assert_eq!(8, report.customers_served);
    assert_eq!(2, report.customers_turned_away);
    assert_eq!(0.0, report.total_wait_time);
    assert_floats_near_equal!(9.0, report.final_time, "last event should be the turned-away arrival");
}
