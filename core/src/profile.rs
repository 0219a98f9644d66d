use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculations::{calculate_daily_calories, goal_adjusted_calories, protein_target, today};
use crate::models::{Goal, NewUser, User, WeightLog};

/// Build a user record from onboarding input, with targets computed from body metrics.
#[must_use]
pub fn create_user(new_user: NewUser) -> User {
    create_user_on(new_user, today())
}

#[must_use]
pub fn create_user_on(new_user: NewUser, today: NaiveDate) -> User {
    let base = calculate_daily_calories(
        new_user.age,
        new_user.weight,
        new_user.gender,
        new_user.unit_system,
    );

    User {
        target_calories: goal_adjusted_calories(base, new_user.goal),
        target_protein: Some(protein_target(new_user.weight, new_user.unit_system)),
        weight_logs: vec![WeightLog {
            date: today,
            weight: new_user.weight,
        }],
        username: new_user.username,
        password: new_user.password,
        name: new_user.name,
        age: new_user.age,
        weight: new_user.weight,
        target_weight: new_user.target_weight,
        goal: new_user.goal,
        unit_system: new_user.unit_system,
        gender: new_user.gender,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub is_onboarded: bool,
    #[serde(default)]
    pub is_logged_in: bool,
}

/// Holds the single local user. Mutators return `false` when no user exists.
pub struct UserProfileStore {
    state: ProfileState,
}

impl UserProfileStore {
    #[must_use]
    pub fn new(state: ProfileState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.is_logged_in
    }

    #[must_use]
    pub fn is_onboarded(&self) -> bool {
        self.state.is_onboarded
    }

    pub fn set_user(&mut self, user: User) {
        self.state.user = Some(user);
        self.state.is_logged_in = true;
    }

    pub fn complete_onboarding(&mut self) {
        self.state.is_onboarded = true;
    }

    /// Exact match against the stored credentials.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        let matches = self
            .state
            .user
            .as_ref()
            .is_some_and(|u| u.username == username && u.password == password);
        if matches {
            self.state.is_logged_in = true;
        }
        matches
    }

    pub fn logout(&mut self) {
        self.state.is_logged_in = false;
    }

    pub fn reset_user(&mut self) {
        self.state = ProfileState::default();
    }

    pub fn update_weight(&mut self, weight: f64) -> bool {
        self.update_weight_on(weight, today())
    }

    /// Record `weight` for `date`, replacing any log already there.
    ///
    /// The current weight follows the most recent log, so a backdated entry leaves it alone.
    pub fn update_weight_on(&mut self, weight: f64, date: NaiveDate) -> bool {
        let Some(user) = self.state.user.as_mut() else {
            return false;
        };
        let log = WeightLog { date, weight };
        match user.weight_logs.iter().position(|l| l.date == date) {
            Some(idx) => user.weight_logs[idx] = log,
            None => {
                user.weight_logs.push(log);
                user.weight_logs.sort_by_key(|l| l.date);
            }
        }
        if let Some(latest) = user.weight_logs.last() {
            user.weight = latest.weight;
        }
        true
    }

    pub fn update_target_weight(&mut self, target_weight: f64) -> bool {
        self.with_user(|u| u.target_weight = target_weight)
    }

    /// Change the goal and recompute the calorie target from current metrics.
    pub fn update_goal(&mut self, goal: Goal) -> bool {
        self.with_user(|u| {
            let base = calculate_daily_calories(u.age, u.weight, u.gender, u.unit_system);
            u.goal = goal;
            u.target_calories = goal_adjusted_calories(base, goal);
        })
    }

    pub fn update_target_calories(&mut self, calories: i64) -> bool {
        self.with_user(|u| u.target_calories = calories)
    }

    pub fn update_target_protein(&mut self, protein: i64) -> bool {
        self.with_user(|u| u.target_protein = Some(protein))
    }

    /// The explicit protein target, or the weight-based default when none is set.
    #[must_use]
    pub fn effective_protein_target(&self) -> Option<i64> {
        self.user().map(|u| {
            u.target_protein
                .unwrap_or_else(|| protein_target(u.weight, u.unit_system))
        })
    }

    fn with_user(&mut self, f: impl FnOnce(&mut User)) -> bool {
        match self.state.user.as_mut() {
            Some(user) => {
                f(user);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, UnitSystem};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_user(goal: Goal, gender: Gender) -> NewUser {
        NewUser {
            username: "alice".to_string(),
            password: "secret1".to_string(),
            name: "Alice".to_string(),
            age: 30,
            weight: 80.0,
            target_weight: 72.0,
            goal,
            unit_system: UnitSystem::Metric,
            gender,
        }
    }

    fn store_with_user(goal: Goal, gender: Gender) -> UserProfileStore {
        let mut store = UserProfileStore::new(ProfileState::default());
        store.set_user(create_user_on(new_user(goal, gender), d("2024-06-15")));
        store
    }

    #[test]
    fn test_create_user_cutting_metric() {
        let user = create_user_on(new_user(Goal::Cutting, Gender::Male), d("2024-06-15"));
        let bmr = calculate_daily_calories(30, 80.0, Gender::Male, UnitSystem::Metric);
        assert_eq!(user.target_calories, bmr - 500);
        assert_eq!(user.target_calories, 2211);
        assert_eq!(user.target_protein, Some(64));
        assert_eq!(
            user.weight_logs,
            vec![WeightLog {
                date: d("2024-06-15"),
                weight: 80.0
            }]
        );
    }

    #[test]
    fn test_create_user_bulking_imperial() {
        let mut nu = new_user(Goal::Bulking, Gender::Male);
        nu.unit_system = UnitSystem::Imperial;
        nu.weight = 180.0;
        let user = create_user_on(nu, d("2024-06-15"));
        let bmr = calculate_daily_calories(30, 180.0, Gender::Male, UnitSystem::Imperial);
        assert_eq!(user.target_calories, bmr + 500);
        assert_eq!(user.target_protein, Some(65));
    }

    #[test]
    fn test_set_user_logs_in() {
        let store = store_with_user(Goal::Maintaining, Gender::Male);
        assert!(store.is_logged_in());
        assert!(!store.is_onboarded());
    }

    #[test]
    fn test_login_exact_match() {
        let mut store = store_with_user(Goal::Maintaining, Gender::Male);
        store.logout();
        assert!(!store.is_logged_in());

        assert!(!store.login("alice", "wrong"));
        assert!(!store.login("Alice", "secret1"));
        assert!(!store.is_logged_in());

        assert!(store.login("alice", "secret1"));
        assert!(store.is_logged_in());
    }

    #[test]
    fn test_login_without_user_fails() {
        let mut store = UserProfileStore::new(ProfileState::default());
        assert!(!store.login("alice", "secret1"));
    }

    #[test]
    fn test_update_weight_same_day_overwrites() {
        let mut store = store_with_user(Goal::Cutting, Gender::Male);
        assert!(store.update_weight_on(79.0, d("2024-06-15")));
        let user = store.user().unwrap();
        assert_eq!(user.weight, 79.0);
        assert_eq!(user.weight_logs.len(), 1);
        assert_eq!(user.weight_logs[0].weight, 79.0);
    }

    #[test]
    fn test_update_weight_new_day_appends() {
        let mut store = store_with_user(Goal::Cutting, Gender::Male);
        store.update_weight_on(79.5, d("2024-06-16"));
        store.update_weight_on(79.0, d("2024-06-17"));
        let logs = &store.user().unwrap().weight_logs;
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[2].date, d("2024-06-17"));
    }

    #[test]
    fn test_backdated_weight_keeps_current_weight() {
        let mut store = store_with_user(Goal::Cutting, Gender::Male);
        assert!(store.update_weight_on(90.0, d("2024-01-01")));
        let user = store.user().unwrap();
        assert_eq!(user.weight, 80.0);
        assert_eq!(user.weight_logs.len(), 2);
        assert_eq!(user.weight_logs[0].date, d("2024-01-01"));
        assert_eq!(user.weight_logs[0].weight, 90.0);

        store.update_goal(Goal::Bulking);
        let base = calculate_daily_calories(30, 80.0, Gender::Male, UnitSystem::Metric);
        assert_eq!(store.user().unwrap().target_calories, base + 500);
    }

    #[test]
    fn test_update_goal_recomputes_calories_with_stored_gender() {
        let mut store = store_with_user(Goal::Maintaining, Gender::Female);
        assert!(store.update_goal(Goal::Cutting));
        let user = store.user().unwrap();
        let base = calculate_daily_calories(30, 80.0, Gender::Female, UnitSystem::Metric);
        assert_eq!(user.goal, Goal::Cutting);
        assert_eq!(user.target_calories, base - 500);
    }

    #[test]
    fn test_update_goal_uses_current_weight() {
        let mut store = store_with_user(Goal::Maintaining, Gender::Male);
        store.update_weight_on(90.0, d("2024-06-20"));
        store.update_goal(Goal::Bulking);
        let base = calculate_daily_calories(30, 90.0, Gender::Male, UnitSystem::Metric);
        assert_eq!(store.user().unwrap().target_calories, base + 500);
    }

    #[test]
    fn test_direct_mutators() {
        let mut store = store_with_user(Goal::Maintaining, Gender::Male);
        assert!(store.update_target_weight(70.0));
        assert!(store.update_target_calories(2400));
        assert!(store.update_target_protein(150));
        let user = store.user().unwrap();
        assert_eq!(user.target_weight, 70.0);
        assert_eq!(user.target_calories, 2400);
        assert_eq!(user.target_protein, Some(150));
    }

    #[test]
    fn test_mutators_without_user_are_noops() {
        let mut store = UserProfileStore::new(ProfileState::default());
        assert!(!store.update_weight(80.0));
        assert!(!store.update_goal(Goal::Bulking));
        assert!(!store.update_target_calories(2000));
        assert!(store.user().is_none());
    }

    #[test]
    fn test_effective_protein_target_falls_back() {
        let mut store = store_with_user(Goal::Maintaining, Gender::Male);
        store.state.user.as_mut().unwrap().target_protein = None;
        assert_eq!(store.effective_protein_target(), Some(64));
        store.update_target_protein(120);
        assert_eq!(store.effective_protein_target(), Some(120));
    }

    #[test]
    fn test_reset_user() {
        let mut store = store_with_user(Goal::Maintaining, Gender::Male);
        store.complete_onboarding();
        store.reset_user();
        assert!(store.user().is_none());
        assert!(!store.is_onboarded());
        assert!(!store.is_logged_in());
    }
}
