/// Running totals kept by the engine while the day plays out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    /// Completions processed, including those finishing after closing.
    pub customers_served: usize,
    /// Sum over served customers of the time between arrival and start of service, in hours.
    pub total_wait_time: f64,
    /// Arrivals dropped because the bank had already closed.
    pub customers_turned_away: usize,
}

impl Metrics {
    pub(crate) fn record_wait(&mut self, wait: f64) {
        self.total_wait_time += wait;
    }

    pub(crate) fn record_completion(&mut self) {
        self.customers_served += 1;
    }

    pub(crate) fn record_turned_away(&mut self) {
        self.customers_turned_away += 1;
    }

    pub fn average_wait(&self) -> AverageWait {
        AverageWait::of(self.total_wait_time, self.customers_served)
    }
}

/// Mean wait per served customer. Undefined when nobody was served, which is reported rather than divided out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AverageWait {
    Hours(f64),
    NotApplicable,
}

impl AverageWait {
    pub fn of(total_wait_time: f64, customers_served: usize) -> Self {
        if customers_served == 0 {
            Self::NotApplicable
        } else {
            Self::Hours(total_wait_time / customers_served as f64)
        }
    }

    pub fn hours(self) -> Option<f64> {
        match self {
            Self::Hours(value) => Some(value),
            Self::NotApplicable => None,
        }
    }
}

impl std::fmt::Display for AverageWait {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Hours(value) => write!(f, "{value:.4} hours"),
            Self::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// Outcome of a finished run, handed to whatever presents it.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub customers_generated: usize,
    pub customers_served: usize,
    pub customers_turned_away: usize,
    /// Still in line when the run ended; closing time came before their turn.
    pub customers_unserved: usize,
    pub total_wait_time: f64,
    pub average_wait: AverageWait,
    /// Clock reading when the last event was processed.
    pub final_time: f64,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Customers served: {}/{}", self.customers_served, self.customers_generated)?;
        writeln!(f, "Turned away after closing: {}", self.customers_turned_away)?;
        writeln!(f, "Left waiting at closing: {}", self.customers_unserved)?;
        writeln!(f, "Total wait time: {:.4} hours", self.total_wait_time)?;
        writeln!(f, "Average wait time: {}", self.average_wait)?;
        write!(f, "Last event at: {:.4} hours", self.final_time)
    }
}
