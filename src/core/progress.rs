//! Learner progress state machine
//!
//! Two states: `Anonymous` until someone registers, then `Registered` for the
//! lifetime of the store. Points only ever grow; the daily completion set is
//! cleared whenever the calendar date changes.

use chrono::NaiveDate;

use crate::core::catalog::Catalog;
use crate::core::model::{ExerciseId, UserProgress, DEFAULT_DAILY_GOAL};
use crate::error::{EduQuestError, Result};

/// Minimum trimmed length of a display name
pub const MIN_NAME_CHARS: usize = 2;

/// Outcome of a completion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Points were added
    Awarded(u32),
    /// Already completed today; nothing changed
    AlreadyCompleted,
    /// No exercise with that id exists
    UnknownExercise,
    /// Nobody is registered
    NotRegistered,
}

impl Completion {
    /// Whether the call changed any state
    pub fn changed(&self) -> bool {
        matches!(self, Completion::Awarded(_))
    }
}

/// Session state of the portal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProgressState {
    #[default]
    Anonymous,
    Registered(UserProgress),
}

impl ProgressState {
    /// Restore from a stored record (or its absence)
    pub fn from_stored(stored: Option<UserProgress>) -> Self {
        match stored {
            Some(user) => ProgressState::Registered(user),
            None => ProgressState::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&UserProgress> {
        match self {
            ProgressState::Registered(user) => Some(user),
            ProgressState::Anonymous => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, ProgressState::Registered(_))
    }

    /// Register a learner.
    ///
    /// The name is trimmed and must be at least two characters long. An
    /// existing identity is never replaced.
    pub fn register(&mut self, name: &str, today: NaiveDate) -> Result<&UserProgress> {
        if let ProgressState::Registered(user) = self {
            return Err(EduQuestError::AlreadyRegistered(user.name.clone()));
        }

        let name = name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(EduQuestError::validation(format!(
                "Name must be at least {} characters long.",
                MIN_NAME_CHARS
            )));
        }

        tracing::info!(name, "registered learner");
        *self = ProgressState::Registered(UserProgress {
            name: name.to_string(),
            total_points: 0,
            daily_goal: DEFAULT_DAILY_GOAL,
            completed_today_ids: Vec::new(),
            last_active_date: today,
        });

        self.user().ok_or(EduQuestError::NotRegistered)
    }

    /// Mark an exercise complete for today.
    ///
    /// Idempotent: a second completion of the same id is a no-op.
    pub fn complete_exercise(&mut self, id: &ExerciseId, catalog: &Catalog) -> Completion {
        let ProgressState::Registered(user) = self else {
            return Completion::NotRegistered;
        };
        let Some(exercise) = catalog.exercise(id) else {
            return Completion::UnknownExercise;
        };
        if user.completed_today_ids.contains(id) {
            return Completion::AlreadyCompleted;
        }

        user.total_points = user.total_points.saturating_add(exercise.points);
        user.completed_today_ids.push(id.clone());
        tracing::debug!(%id, points = exercise.points, total = user.total_points, "exercise completed");
        Completion::Awarded(exercise.points)
    }

    /// Reset the daily completion set if the date changed since last activity.
    ///
    /// Returns true when a rollover happened. Total points are untouched.
    pub fn rollover(&mut self, today: NaiveDate) -> bool {
        let ProgressState::Registered(user) = self else {
            return false;
        };
        if user.last_active_date == today {
            return false;
        }

        tracing::info!(from = %user.last_active_date, to = %today, "new day, resetting daily completions");
        user.completed_today_ids.clear();
        user.last_active_date = today;
        true
    }

    /// Drop ids of exercises that no longer exist. Points are kept.
    pub fn forget(&mut self, ids: &[ExerciseId]) -> bool {
        let ProgressState::Registered(user) = self else {
            return false;
        };
        let before = user.completed_today_ids.len();
        user.completed_today_ids.retain(|id| !ids.contains(id));
        before != user.completed_today_ids.len()
    }

    pub fn is_completed(&self, id: &ExerciseId) -> bool {
        self.user()
            .map(|u| u.completed_today_ids.contains(id))
            .unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.user().map(|u| u.completed_today_ids.len()).unwrap_or(0)
    }

    /// Completions still needed to reach today's goal
    pub fn remaining_today(&self) -> usize {
        self.user()
            .map(|u| (u.daily_goal as usize).saturating_sub(u.completed_today_ids.len()))
            .unwrap_or(0)
    }

    /// Today's progress toward the daily goal, clamped to 0..=100
    pub fn progress_percent(&self) -> u8 {
        self.user().map(progress_percent).unwrap_or(0)
    }
}

/// `min(100, round(100 * completed / goal))`; a zero goal counts as met
pub fn progress_percent(user: &UserProgress) -> u8 {
    if user.daily_goal == 0 {
        return 100;
    }
    let completed = user.completed_today_ids.len() as u64;
    let goal = u64::from(user.daily_goal);
    // Integer round-half-up of 100 * completed / goal
    let percent = (200 * completed + goal) / (2 * goal);
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Difficulty, ExerciseDraft};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn catalog_with(points: &[u32]) -> (Catalog, Vec<ExerciseId>) {
        let mut catalog = Catalog::empty();
        catalog.add_subject("Math", "➗", "bg-blue-500").unwrap();
        let ids = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let draft = ExerciseDraft {
                    title: format!("Exercise {i}"),
                    description: String::new(),
                    url: "https://example.com".into(),
                    subject: "Math".into(),
                    difficulty: Difficulty::Easy,
                    points: *p,
                };
                catalog.add_exercise(&draft).unwrap().id.clone()
            })
            .collect();
        (catalog, ids)
    }

    #[test]
    fn test_register_valid_name() {
        let mut state = ProgressState::default();
        let user = state.register("  Ana  ", day(16)).unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.total_points, 0);
        assert_eq!(user.daily_goal, 3);
        assert!(user.completed_today_ids.is_empty());
        assert_eq!(user.last_active_date, day(16));
    }

    #[test]
    fn test_register_short_name_stays_anonymous() {
        let mut state = ProgressState::default();
        for name in ["", " ", "A", "  b  "] {
            assert!(matches!(
                state.register(name, day(16)),
                Err(EduQuestError::Validation(_))
            ));
            assert_eq!(state, ProgressState::Anonymous);
        }
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let mut state = ProgressState::default();
        state.register("Ana", day(16)).unwrap();
        assert!(matches!(
            state.register("Bia", day(16)),
            Err(EduQuestError::AlreadyRegistered(name)) if name == "Ana"
        ));
        assert_eq!(state.user().unwrap().name, "Ana");
    }

    #[test]
    fn test_complete_is_idempotent() {
        let (catalog, ids) = catalog_with(&[20]);
        let mut state = ProgressState::default();
        state.register("Ana", day(16)).unwrap();

        assert_eq!(state.complete_exercise(&ids[0], &catalog), Completion::Awarded(20));
        assert_eq!(
            state.complete_exercise(&ids[0], &catalog),
            Completion::AlreadyCompleted
        );

        let user = state.user().unwrap();
        assert_eq!(user.total_points, 20);
        assert_eq!(user.completed_today_ids, vec![ids[0].clone()]);
    }

    #[test]
    fn test_complete_requires_registration_and_known_exercise() {
        let (catalog, ids) = catalog_with(&[10]);
        let mut state = ProgressState::default();
        assert_eq!(
            state.complete_exercise(&ids[0], &catalog),
            Completion::NotRegistered
        );

        state.register("Ana", day(16)).unwrap();
        assert_eq!(
            state.complete_exercise(&ExerciseId::from("missing"), &catalog),
            Completion::UnknownExercise
        );
        assert_eq!(state.user().unwrap().total_points, 0);
    }

    #[test]
    fn test_progress_percent_is_monotone_and_clamped() {
        let (catalog, ids) = catalog_with(&[5, 5, 5, 5, 5]);
        let mut state = ProgressState::default();
        state.register("Ana", day(16)).unwrap();

        let mut last = state.progress_percent();
        assert_eq!(last, 0);
        let mut seen = Vec::new();
        for id in &ids {
            state.complete_exercise(id, &catalog);
            let now = state.progress_percent();
            assert!(now >= last);
            last = now;
            seen.push(now);
        }
        assert_eq!(seen, vec![33, 67, 100, 100, 100]);
    }

    #[test]
    fn test_progress_percent_zero_goal() {
        let mut state = ProgressState::default();
        state.register("Ana", day(16)).unwrap();
        if let ProgressState::Registered(user) = &mut state {
            user.daily_goal = 0;
        }
        assert_eq!(state.progress_percent(), 100);
    }

    #[test]
    fn test_rollover_resets_daily_set_only() {
        let (catalog, ids) = catalog_with(&[20, 10]);
        let mut state = ProgressState::default();
        state.register("Ana", day(16)).unwrap();
        state.complete_exercise(&ids[0], &catalog);
        state.complete_exercise(&ids[1], &catalog);

        assert!(!state.rollover(day(16)));
        assert_eq!(state.completed_count(), 2);

        assert!(state.rollover(day(17)));
        let user = state.user().unwrap();
        assert!(user.completed_today_ids.is_empty());
        assert_eq!(user.total_points, 30);
        assert_eq!(user.last_active_date, day(17));

        // The same exercise can be completed again on the new day
        assert_eq!(state.complete_exercise(&ids[0], &catalog), Completion::Awarded(20));
        assert_eq!(state.user().unwrap().total_points, 50);
    }

    #[test]
    fn test_forget_keeps_points() {
        let (catalog, ids) = catalog_with(&[20, 10]);
        let mut state = ProgressState::default();
        state.register("Ana", day(16)).unwrap();
        state.complete_exercise(&ids[0], &catalog);
        state.complete_exercise(&ids[1], &catalog);

        assert!(state.forget(&ids[..1]));
        assert!(!state.is_completed(&ids[0]));
        assert!(state.is_completed(&ids[1]));
        assert_eq!(state.user().unwrap().total_points, 30);
        assert_eq!(state.remaining_today(), 2);
    }

    #[test]
    fn test_anonymous_helpers() {
        let state = ProgressState::from_stored(None);
        assert!(!state.is_registered());
        assert_eq!(state.progress_percent(), 0);
        assert_eq!(state.remaining_today(), 0);
    }
}
