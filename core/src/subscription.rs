use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::TierPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionState {
    #[serde(default)]
    pub is_pro: bool,
    #[serde(default)]
    pub subscription_date: Option<DateTime<Utc>>,
}

/// The Pro flag. Billing is mocked; subscribing just flips the flag.
pub struct SubscriptionStore {
    is_pro: Arc<AtomicBool>,
    subscription_date: Option<DateTime<Utc>>,
}

impl SubscriptionStore {
    #[must_use]
    pub fn new(state: SubscriptionState) -> Self {
        Self {
            is_pro: Arc::new(AtomicBool::new(state.is_pro)),
            subscription_date: state.subscription_date,
        }
    }

    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        SubscriptionState {
            is_pro: self.is_pro(),
            subscription_date: self.subscription_date,
        }
    }

    #[must_use]
    pub fn is_pro(&self) -> bool {
        self.is_pro.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn subscription_date(&self) -> Option<DateTime<Utc>> {
        self.subscription_date
    }

    pub fn set_pro_status(&mut self, status: bool) {
        self.set_pro_status_at(status, Utc::now());
    }

    pub fn set_pro_status_at(&mut self, status: bool, now: DateTime<Utc>) {
        self.is_pro.store(status, Ordering::SeqCst);
        self.subscription_date = status.then_some(now);
    }

    pub fn cancel_subscription(&mut self) {
        self.is_pro.store(false, Ordering::SeqCst);
        self.subscription_date = None;
    }

    /// A handle that reads the live flag, for stores that gate features on it.
    #[must_use]
    pub fn policy(&self) -> SubscriptionPolicy {
        SubscriptionPolicy {
            is_pro: Arc::clone(&self.is_pro),
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionPolicy {
    is_pro: Arc<AtomicBool>,
}

impl TierPolicy for SubscriptionPolicy {
    fn is_pro(&self) -> bool {
        self.is_pro.load(Ordering::SeqCst)
    }
}
