//! Random customer generation.
//!
//! The engine does not care how customers are drawn; it only consumes the records produced here. Anything that
//! implements [`SampleSource`] can stand in for the default [`BankSampler`].

use crate::clock::hours;
use crate::customer::{Customer, CustomerId};

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64;

/// Draws the two random quantities that describe a customer.
pub trait SampleSource {
    /// Arrival time in hours, expected in `[0, window)`.
    fn sample_arrival_time(&mut self) -> f64;

    /// Units of work the customer brings, expected positive.
    fn sample_work_amount(&mut self) -> f64;
}

/// A normal distribution restricted to `[low, high]`, sampled by rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedNormal {
    mean: f64,
    std_dev: f64,
    low: f64,
    high: f64,
}

impl TruncatedNormal {
    /// Rejection gives up after this many draws and clamps the last one into range.
    const MAX_ATTEMPTS: usize = 1024;

    /// Returns `None` unless `std_dev` is positive and `low < high`, all finite.
    pub fn new(mean: f64, std_dev: f64, low: f64, high: f64) -> Option<Self> {
        let finite = [mean, std_dev, low, high].iter().all(|value| value.is_finite());
        if finite && std_dev > 0.0 && low < high {
            Some(Self {
                mean,
                std_dev,
                low,
                high,
            })
        } else {
            None
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let mut value = self.mean;
        for _ in 0..Self::MAX_ATTEMPTS {
            let z: f64 = rng.sample(StandardNormal);
            value = self.mean + self.std_dev * z;
            if (self.low..=self.high).contains(&value) {
                return value;
            }
        }
        value.clamp(self.low, self.high)
    }
}

impl Default for TruncatedNormal {
    /// Mean 5, standard deviation 0.5, cut off at 0 and 20 standard deviations above the mean.
    fn default() -> Self {
        Self {
            mean: 5.0,
            std_dev: 0.5,
            low: 5.0,
            high: 15.0,
        }
    }
}

/// Uniform arrivals over the operating window and truncated-normal work amounts.
#[derive(Debug, Clone)]
pub struct BankSampler<R> {
    rng: R,
    window_hours: f64,
    work: TruncatedNormal,
}

impl<R: Rng> BankSampler<R> {
    /// `window_hours` must be positive; [`Config::validate()`] checks this before a sampler is built from it.
    ///
    /// [`Config::validate()`]: crate::Config::validate
    pub fn new(rng: R, window_hours: f64) -> Self {
        Self {
            rng,
            window_hours,
            work: TruncatedNormal::default(),
        }
    }

    pub fn with_work_distribution(mut self, work: TruncatedNormal) -> Self {
        self.work = work;
        self
    }
}

impl BankSampler<Pcg64> {
    /// A sampler whose draws are fully determined by `seed`.
    pub fn seeded(seed: u64, window_hours: f64) -> Self {
        Self::new(Pcg64::seed_from_u64(seed), window_hours)
    }

    /// A sampler seeded from the thread-local generator.
    pub fn from_entropy(window_hours: f64) -> Self {
        Self::new(Pcg64::from_rng(&mut rand::rng()), window_hours)
    }
}

impl<R: Rng> SampleSource for BankSampler<R> {
    fn sample_arrival_time(&mut self) -> f64 {
        self.rng.random_range(0.0..self.window_hours)
    }

    fn sample_work_amount(&mut self) -> f64 {
        self.work.sample(&mut self.rng)
    }
}

/// Generate `count` customers with ids `0..count`, drawing each one's arrival time and then its work amount.
///
/// # Errors
///
/// [`Error::InvalidCustomer`] if the source produced a NaN arrival time.
///
/// [`Error::InvalidCustomer`]: crate::Error::InvalidCustomer
pub fn generate_customers<S>(count: usize, source: &mut S) -> crate::Result<Vec<Customer>>
where
    S: SampleSource + ?Sized,
{
    (0..count)
        .map(|index| {
            let id = CustomerId(index);
            let arrival_time = hours(source.sample_arrival_time()).ok_or(crate::Error::InvalidCustomer {
                customer: id,
                reason: "arrival time is NaN",
            })?;
            let work_amount = source.sample_work_amount();
            Ok(Customer {
                id,
                work_amount,
                arrival_time,
            })
        })
        .collect()
}
