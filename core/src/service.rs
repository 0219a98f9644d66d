use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use crate::analysis::{FoodImageAnalyzer, encode_image};
use crate::analytics::{
    DayNutrition, NutritionRange, WeightRange, filter_weight_logs, nutrition_series,
    weight_progress,
};
use crate::calculations::today;
use crate::ledger::{LedgerState, NutritionLedger, PinOutcome};
use crate::models::{
    DailyLog, DailyStats, FoodAnalysis, FoodEntry, Goal, NewFoodEntry, NewUser, User, WeightLog,
};
use crate::profile::{ProfileState, UserProfileStore, create_user};
use crate::storage::{FOOD_KEY, SUBSCRIPTION_KEY, Storage, USER_KEY};
use crate::subscription::{SubscriptionState, SubscriptionStore};

/// The three stores plus the storage they persist to.
///
/// Every successful mutation rewrites the affected store's record before returning.
pub struct PlatewiseService {
    storage: Storage,
    profile: UserProfileStore,
    ledger: NutritionLedger,
    subscription: SubscriptionStore,
}

impl PlatewiseService {
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::from_storage(Storage::open(db_path)?)
    }

    pub fn new_in_memory() -> Result<Self> {
        Self::from_storage(Storage::open_in_memory()?)
    }

    fn from_storage(storage: Storage) -> Result<Self> {
        let profile_state: ProfileState = storage.load_or_default(USER_KEY)?;
        let ledger_state: LedgerState = storage.load_or_default(FOOD_KEY)?;
        let subscription_state: SubscriptionState = storage.load_or_default(SUBSCRIPTION_KEY)?;

        let subscription = SubscriptionStore::new(subscription_state);
        let ledger = NutritionLedger::new(ledger_state, Box::new(subscription.policy()));
        let profile = UserProfileStore::new(profile_state);

        Ok(Self {
            storage,
            profile,
            ledger,
            subscription,
        })
    }

    // --- Persistence ---

    fn persist_profile(&self) -> Result<()> {
        self.storage.save(USER_KEY, self.profile.state())
    }

    fn persist_ledger(&self) -> Result<()> {
        self.storage.save(FOOD_KEY, self.ledger.state())
    }

    fn persist_subscription(&self) -> Result<()> {
        self.storage.save(SUBSCRIPTION_KEY, &self.subscription.state())
    }

    // --- Profile ---

    #[must_use]
    pub fn profile(&self) -> &UserProfileStore {
        &self.profile
    }

    /// The logged-in user, or an error telling the caller how to get one.
    pub fn current_user(&self) -> Result<&User> {
        let Some(user) = self.profile.user() else {
            bail!("No profile found. Run `platewise onboard` to create one.");
        };
        if !self.profile.is_logged_in() {
            bail!("Not logged in. Run `platewise login <username> <password>`.");
        }
        Ok(user)
    }

    /// Create the profile, log in, and mark onboarding complete.
    pub fn onboard(&mut self, new_user: NewUser) -> Result<&User> {
        crate::models::validate_new_user(&new_user)?;
        if self.profile.user().is_some() {
            bail!("A profile already exists. Run `platewise reset --account` to start over.");
        }
        self.profile.set_user(create_user(new_user));
        self.profile.complete_onboarding();
        self.persist_profile()?;
        self.current_user()
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        let ok = self.profile.login(username, password);
        if ok {
            self.persist_profile()?;
        }
        Ok(ok)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.profile.logout();
        self.persist_profile()
    }

    /// Delete the profile, food log and subscription, removing their stored records.
    pub fn delete_account(&mut self) -> Result<()> {
        self.ledger.clear_all_data();
        self.subscription.cancel_subscription();
        self.profile.reset_user();
        for key in [USER_KEY, FOOD_KEY, SUBSCRIPTION_KEY] {
            self.storage.delete(key)?;
        }
        tracing::debug!("deleted account records");
        Ok(())
    }

    pub fn update_weight(&mut self, weight: f64) -> Result<&User> {
        self.update_weight_on(weight, today())
    }

    pub fn update_weight_on(&mut self, weight: f64, date: NaiveDate) -> Result<&User> {
        crate::models::validate_weight(weight, "weight")?;
        self.current_user()?;
        self.profile.update_weight_on(weight, date);
        self.persist_profile()?;
        self.current_user()
    }

    pub fn update_target_weight(&mut self, weight: f64) -> Result<&User> {
        crate::models::validate_weight(weight, "target weight")?;
        self.current_user()?;
        self.profile.update_target_weight(weight);
        self.persist_profile()?;
        self.current_user()
    }

    pub fn update_goal(&mut self, goal: Goal) -> Result<&User> {
        self.current_user()?;
        self.profile.update_goal(goal);
        self.persist_profile()?;
        self.current_user()
    }

    pub fn update_target_calories(&mut self, calories: i64) -> Result<&User> {
        if calories <= 0 {
            bail!("Calorie target must be greater than 0");
        }
        self.current_user()?;
        self.profile.update_target_calories(calories);
        self.persist_profile()?;
        self.current_user()
    }

    pub fn update_target_protein(&mut self, protein: i64) -> Result<&User> {
        if protein <= 0 {
            bail!("Protein target must be greater than 0");
        }
        self.current_user()?;
        self.profile.update_target_protein(protein);
        self.persist_profile()?;
        self.current_user()
    }

    // --- Ledger ---

    #[must_use]
    pub fn ledger(&self) -> &NutritionLedger {
        &self.ledger
    }

    /// Log a food entry for today. `Ok(None)` means the free-tier daily limit refused it.
    pub fn add_entry(&mut self, draft: NewFoodEntry) -> Result<Option<FoodEntry>> {
        crate::models::validate_new_food(&draft)?;
        self.current_user()?;
        let added = self.ledger.add_entry(draft);
        if added.is_some() {
            self.persist_ledger()?;
        }
        Ok(added)
    }

    pub fn remove_entry(&mut self, id: &str) -> Result<Option<FoodEntry>> {
        let removed = self.ledger.remove_entry(id);
        if removed.is_some() {
            self.persist_ledger()?;
        }
        Ok(removed)
    }

    pub fn toggle_pin_entry(&mut self, id: &str) -> Result<PinOutcome> {
        let outcome = self.ledger.toggle_pin_entry(id);
        if matches!(outcome, PinOutcome::Pinned | PinOutcome::Unpinned) {
            self.persist_ledger()?;
        }
        Ok(outcome)
    }

    #[must_use]
    pub fn today_entries(&self) -> Vec<&FoodEntry> {
        self.ledger.today_entries()
    }

    #[must_use]
    pub fn today_stats(&self) -> DailyStats {
        self.ledger.today_stats()
    }

    #[must_use]
    pub fn daily_log(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.ledger.daily_logs().get(&date)
    }

    /// Find an entry by full id or by a unique id prefix.
    pub fn resolve_entry_id(&self, id_or_prefix: &str) -> Result<String> {
        let id_or_prefix = id_or_prefix.trim();
        if id_or_prefix.is_empty() {
            bail!("Entry id is required");
        }
        if let Some(e) = self.ledger.entry(id_or_prefix) {
            return Ok(e.id.clone());
        }
        let matches: Vec<&FoodEntry> = self
            .ledger
            .state()
            .entries
            .iter()
            .filter(|e| e.id.starts_with(id_or_prefix))
            .collect();
        match matches.as_slice() {
            [one] => Ok(one.id.clone()),
            [] => Ok(id_or_prefix.to_string()),
            _ => bail!("Entry id '{id_or_prefix}' is ambiguous; use more characters"),
        }
    }

    pub fn clear_all_data(&mut self) -> Result<()> {
        self.ledger.clear_all_data();
        self.persist_ledger()
    }

    // --- Subscription ---

    #[must_use]
    pub fn subscription(&self) -> &SubscriptionStore {
        &self.subscription
    }

    pub fn set_pro_status(&mut self, status: bool) -> Result<()> {
        self.subscription.set_pro_status(status);
        self.persist_subscription()
    }

    pub fn cancel_subscription(&mut self) -> Result<()> {
        self.subscription.cancel_subscription();
        self.persist_subscription()
    }

    // --- Image analysis ---

    /// Ask `analyzer` for a nutrition estimate of the image in `image_bytes`.
    pub fn analyze_food_image(
        &self,
        analyzer: &dyn FoodImageAnalyzer,
        image_bytes: &[u8],
    ) -> Result<FoodAnalysis> {
        if image_bytes.is_empty() {
            bail!("Image is empty");
        }
        let encoded = encode_image(image_bytes);
        analyzer
            .analyze(&encoded)
            .context("Failed to analyze food image. Please try again.")
    }

    // --- Analytics ---

    pub fn weight_history(&self, range: WeightRange) -> Result<Vec<WeightLog>> {
        let user = self.current_user()?;
        Ok(filter_weight_logs(&user.weight_logs, range, today()))
    }

    pub fn weight_progress(&self, range: WeightRange) -> Result<f64> {
        let user = self.current_user()?;
        let logs = filter_weight_logs(&user.weight_logs, range, today());
        Ok(weight_progress(&logs, user.goal, user.target_weight))
    }

    #[must_use]
    pub fn nutrition_series(&self, range: NutritionRange) -> Vec<DayNutrition> {
        nutrition_series(self.ledger.daily_logs(), range, today())
    }
}
