use crate::error::ConfigError;

/// Parameters of one simulated day. Read once when the simulation is built and never changed during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Number of service windows open in parallel.
    pub num_servers: usize,
    /// Work units a window gets through per hour.
    pub service_rate: f64,
    /// Customers generated for the day.
    pub num_customers: usize,
    /// Length of the business day in hours. Nobody is admitted or starts service at or after this time.
    pub operating_window_hours: f64,
}

/// Preset configurations.
///
/// Rates are in work units per hour; a customer with the typical five units of work keeps a window busy for half an
/// hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Ten windows and 160 customers over an eight-hour day.
    #[default]
    Default,
    /// Two windows and ten customers over an eight-hour day.
    Small,
}

impl Scenario {
    pub fn config(self) -> Config {
        match self {
            Self::Default => Config {
                num_servers: 10,
                service_rate: 10.0,
                num_customers: 160,
                operating_window_hours: 8.0,
            },
            Self::Small => Config {
                num_servers: 2,
                service_rate: 10.0,
                num_customers: 10,
                operating_window_hours: 8.0,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Scenario::Default.config()
    }
}

impl Config {
    /// Check every field is in range.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found, checked in field order.
    // negated comparisons are deliberate so that NaN fails them
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_servers == 0 {
            return Err(ConfigError::NoServers);
        }
        if !(self.service_rate > 0.0 && self.service_rate.is_finite()) {
            return Err(ConfigError::NonPositiveServiceRate(self.service_rate));
        }
        if self.num_customers == 0 {
            return Err(ConfigError::NoCustomers);
        }
        if !(self.operating_window_hours > 0.0 && self.operating_window_hours.is_finite()) {
            return Err(ConfigError::NonPositiveWindow(self.operating_window_hours));
        }
        Ok(())
    }

    /// Whether the bank still admits customers and starts new services at `time`. The window is half-open:
    /// closing time itself counts as closed.
    pub fn is_open_at(&self, time: f64) -> bool {
        time < self.operating_window_hours
    }
}
