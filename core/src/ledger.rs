use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DailyLog, DailyStats, FoodEntry, NewFoodEntry};

/// Entries a free-tier account may log per calendar day.
pub const FREE_DAILY_ENTRY_LIMIT: usize = 3;

/// Answers whether the current account is on the paid tier.
///
/// The ledger asks on every gated call, so implementations must reflect
/// upgrades and cancellations made after the ledger was built.
pub trait TierPolicy: Send + Sync {
    fn is_pro(&self) -> bool;
}

/// Persisted ledger contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub entries: Vec<FoodEntry>,
    #[serde(default)]
    pub daily_logs: BTreeMap<NaiveDate, DailyLog>,
    #[serde(default)]
    pub pinned_entries: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinOutcome {
    Pinned,
    Unpinned,
    /// Free tier may unpin but not pin.
    Rejected,
    NotFound,
}

pub struct NutritionLedger {
    state: LedgerState,
    policy: Box<dyn TierPolicy>,
}

impl NutritionLedger {
    pub fn new(state: LedgerState, policy: Box<dyn TierPolicy>) -> Self {
        Self { state, policy }
    }

    #[must_use]
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn add_entry(&mut self, draft: NewFoodEntry) -> Option<FoodEntry> {
        self.add_entry_at(draft, Local::now())
    }

    /// Log a new entry attributed to the calendar day of `now`.
    ///
    /// Returns `None` without touching the ledger when a free-tier account has
    /// already reached its daily limit.
    pub fn add_entry_at(&mut self, draft: NewFoodEntry, now: DateTime<Local>) -> Option<FoodEntry> {
        let date = now.date_naive();

        if !self.policy.is_pro() && self.count_on(date) >= FREE_DAILY_ENTRY_LIMIT {
            tracing::warn!(
                %date,
                limit = FREE_DAILY_ENTRY_LIMIT,
                "free tier daily entry limit reached; upgrade to Pro for unlimited tracking"
            );
            return None;
        }

        let entry = FoodEntry {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            ingredients: draft.ingredients,
            calories: draft.calories,
            protein: draft.protein,
            carbs: draft.carbs,
            fats: draft.fats,
            date,
            image_uri: draft.image_uri,
            created_at: now.timestamp_millis(),
        };

        let log = self
            .state
            .daily_logs
            .entry(date)
            .or_insert_with(|| DailyLog::empty(date));
        log.total_calories += entry.calories;
        log.total_protein += entry.protein;
        log.total_carbs += entry.carbs.unwrap_or(0.0);
        log.total_fats += entry.fats.unwrap_or(0.0);
        log.entries.push(entry.clone());

        self.state.entries.push(entry.clone());
        tracing::debug!(id = %entry.id, %date, "added food entry");
        Some(entry)
    }

    /// Remove an entry and back its values out of the owning day's totals.
    ///
    /// Unknown ids are ignored. Totals that would drop below zero are clamped.
    pub fn remove_entry(&mut self, id: &str) -> Option<FoodEntry> {
        let pos = self.state.entries.iter().position(|e| e.id == id)?;
        let entry = self.state.entries.remove(pos);
        self.state.pinned_entries.remove(id);

        let date = entry.date;
        let Some(log) = self.state.daily_logs.get_mut(&date) else {
            tracing::warn!(%id, %date, "removed entry had no daily log");
            return Some(entry);
        };

        log.total_calories = subtract_clamped(log.total_calories, entry.calories, "calories");
        log.total_protein = subtract_clamped(log.total_protein, entry.protein, "protein");
        log.total_carbs = subtract_clamped(log.total_carbs, entry.carbs.unwrap_or(0.0), "carbs");
        log.total_fats = subtract_clamped(log.total_fats, entry.fats.unwrap_or(0.0), "fats");
        log.entries.retain(|e| e.id != id);

        if log.entries.is_empty() {
            self.state.daily_logs.remove(&date);
        }

        Some(entry)
    }

    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&FoodEntry> {
        self.state.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn entries_on(&self, date: NaiveDate) -> Vec<&FoodEntry> {
        self.state.entries.iter().filter(|e| e.date == date).collect()
    }

    #[must_use]
    pub fn today_entries(&self) -> Vec<&FoodEntry> {
        self.entries_on(Local::now().date_naive())
    }

    #[must_use]
    pub fn stats_on(&self, date: NaiveDate) -> DailyStats {
        self.state
            .daily_logs
            .get(&date)
            .map(DailyLog::stats)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn today_stats(&self) -> DailyStats {
        self.stats_on(Local::now().date_naive())
    }

    /// Pin or unpin an entry.
    ///
    /// Unpinning is always allowed, even for ids whose entry is gone. Pinning
    /// requires the paid tier and an existing entry.
    pub fn toggle_pin_entry(&mut self, id: &str) -> PinOutcome {
        if self.state.pinned_entries.remove(id) {
            return PinOutcome::Unpinned;
        }
        if !self.policy.is_pro() {
            tracing::warn!(%id, "pinning meals is a Pro feature");
            return PinOutcome::Rejected;
        }
        if self.entry(id).is_none() {
            return PinOutcome::NotFound;
        }
        self.state.pinned_entries.insert(id.to_string());
        PinOutcome::Pinned
    }

    #[must_use]
    pub fn is_pinned(&self, id: &str) -> bool {
        self.state.pinned_entries.contains(id)
    }

    /// Pinned entries that still exist, newest day first.
    #[must_use]
    pub fn pinned_entries(&self) -> Vec<&FoodEntry> {
        let mut pinned: Vec<&FoodEntry> = self
            .state
            .entries
            .iter()
            .filter(|e| self.is_pinned(&e.id))
            .collect();
        pinned.sort_by(|a, b| b.date.cmp(&a.date).then(a.created_at.cmp(&b.created_at)));
        pinned
    }

    #[must_use]
    pub fn daily_logs(&self) -> &BTreeMap<NaiveDate, DailyLog> {
        &self.state.daily_logs
    }

    /// Dates with at least one logged entry, newest first.
    #[must_use]
    pub fn logged_dates(&self) -> Vec<NaiveDate> {
        self.state.daily_logs.keys().rev().copied().collect()
    }

    pub fn clear_all_data(&mut self) {
        self.state = LedgerState::default();
    }

    fn count_on(&self, date: NaiveDate) -> usize {
        self.state.entries.iter().filter(|e| e.date == date).count()
    }
}

fn subtract_clamped(total: f64, value: f64, field: &str) -> f64 {
    let result = total - value;
    if result < 0.0 {
        // Float residue stays silent.
        if result < -1e-6 {
            tracing::warn!(field, total, value, "daily total would go negative; clamping to zero");
        }
        return 0.0;
    }
    result
}
