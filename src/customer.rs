use crate::clock::Hours;

/// Unique identifier of a customer within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomerId(pub usize);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A customer generated before the day starts. Never modified afterwards; events and the waiting queue refer to it
/// by [`CustomerId`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    /// Units of work the customer needs done, always positive.
    pub work_amount: f64,
    /// When the customer walks in, in hours since opening.
    pub arrival_time: Hours,
}

impl Customer {
    /// Time a server with the given rate (work units per hour) spends on this customer.
    pub fn service_duration(&self, service_rate: f64) -> f64 {
        self.work_amount / service_rate
    }
}

/// Every customer of a run, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct CustomerRegistry {
    customers: Vec<Customer>,
}

impl CustomerRegistry {
    /// Build a registry, rejecting duplicate ids and records the engine cannot simulate.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCustomer`] for a duplicate id, a non-positive or non-finite work amount, or a negative or
    /// infinite arrival time.
    ///
    /// [`Error::InvalidCustomer`]: crate::Error::InvalidCustomer
    pub fn new(mut customers: Vec<Customer>) -> crate::Result<Self> {
        for customer in &customers {
            let reason = if !(customer.work_amount.is_finite() && customer.work_amount > 0.0) {
                Some("work amount must be positive and finite")
            } else if !(customer.arrival_time.is_finite() && customer.arrival_time.into_inner() >= 0.0) {
                Some("arrival time must be non-negative and finite")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(crate::Error::InvalidCustomer {
                    customer: customer.id,
                    reason,
                });
            }
        }

        customers.sort_by_key(|customer| customer.id);
        if let Some(pair) = customers.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(crate::Error::InvalidCustomer {
                customer: pair[0].id,
                reason: "duplicate customer id",
            });
        }

        Ok(Self { customers })
    }

    pub fn get(&self, id: CustomerId) -> Option<&Customer> {
        self.customers
            .binary_search_by_key(&id, |customer| customer.id)
            .ok()
            .map(|index| &self.customers[index])
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Customers in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Customer> {
        self.customers.iter()
    }
}
