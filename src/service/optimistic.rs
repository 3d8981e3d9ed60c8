//! Optimistic Updates
//!
//! Predicted state is shown immediately and replaced by whatever the store
//! confirms. If persisting fails the last confirmed snapshot comes back.

/// A pending write: last confirmed snapshot plus the predicted result
#[derive(Debug, Clone)]
pub struct Optimistic<T> {
    confirmed: T,
    predicted: T,
}

/// How a pending write ended
#[derive(Debug)]
pub enum Settled<T, E> {
    Confirmed(T),
    RolledBack { snapshot: T, error: E },
}

impl<T> Optimistic<T> {
    pub fn begin(confirmed: T, predicted: T) -> Self {
        Self {
            confirmed,
            predicted,
        }
    }

    /// State to render while the write is in flight
    pub fn predicted(&self) -> &T {
        &self.predicted
    }

    pub fn confirmed(&self) -> &T {
        &self.confirmed
    }

    pub fn settle<E>(self, result: Result<T, E>) -> Settled<T, E> {
        match result {
            Ok(persisted) => Settled::Confirmed(persisted),
            Err(error) => Settled::RolledBack {
                snapshot: self.confirmed,
                error,
            },
        }
    }
}

impl<T, E> Settled<T, E> {
    /// The state to render once settled
    pub fn current(&self) -> &T {
        match self {
            Settled::Confirmed(value) => value,
            Settled::RolledBack { snapshot, .. } => snapshot,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Settled::Confirmed(value) => Ok(value),
            Settled::RolledBack { error, .. } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_uses_persisted_value() {
        let pending = Optimistic::begin(90, 115);
        assert_eq!(*pending.predicted(), 115);

        let settled = pending.settle::<&str>(Ok(115));
        assert_eq!(*settled.current(), 115);
        assert_eq!(settled.into_result(), Ok(115));
    }

    #[test]
    fn test_failure_rolls_back() {
        let pending = Optimistic::begin(90, 115);
        let settled = pending.settle(Err("store offline"));

        assert_eq!(*settled.current(), 90);
        assert!(matches!(
            settled,
            Settled::RolledBack { snapshot: 90, error: "store offline" }
        ));
    }
}
