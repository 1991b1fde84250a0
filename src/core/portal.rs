//! Portal application state
//!
//! `Portal` is the single owner of everything the learner and teacher touch:
//! the catalog, the progress record, the current subject selection, teacher
//! mode and the add forms. Every mutation goes through a named command and is
//! written to the store before the command returns.

use crate::ai::tips::{TipBoard, TipTicket};
use crate::core::catalog::{Catalog, Confirmation};
use crate::core::clock::Clock;
use crate::core::defaults::{default_exercises, default_subjects};
use crate::core::elevation::ElevationGate;
use crate::core::model::{
    Exercise, ExerciseDraft, ExerciseId, Subject, SubjectDraft, UserProgress,
};
use crate::core::progress::{Completion, ProgressState};
use crate::core::store::{KeyValueStore, PortalStore};
use crate::error::{EduQuestError, Result};

/// Application state plus its persistence boundary
#[derive(Debug)]
pub struct Portal<S: KeyValueStore> {
    store: PortalStore<S>,
    clock: Clock,
    gate: ElevationGate,
    catalog: Catalog,
    progress: ProgressState,
    elevated: bool,
    selected: Option<String>,
    tips: TipBoard,
    /// Add-subject form buffer
    pub subject_form: SubjectDraft,
    /// Add-exercise form buffer
    pub exercise_form: ExerciseDraft,
}

/// In-memory state a catalog edit may touch
struct Snapshot {
    catalog: Catalog,
    progress: ProgressState,
    selected: Option<String>,
    tips: TipBoard,
    exercise_form: ExerciseDraft,
}

impl<S: KeyValueStore> Portal<S> {
    /// Load state from the store.
    ///
    /// Missing or corrupted collections are replaced by the built-in catalog,
    /// and the day-rollover check runs before anything reads the progress.
    pub fn load(mut store: PortalStore<S>, gate: ElevationGate, clock: Clock) -> Self {
        let subjects = store.load_subjects().unwrap_or_else(|| {
            tracing::info!("no stored subjects, seeding defaults");
            let subjects = default_subjects();
            if let Err(e) = store.save_subjects(&subjects) {
                tracing::warn!(error = %e, "could not save default subjects");
            }
            subjects
        });
        let exercises = store.load_exercises().unwrap_or_else(|| {
            tracing::info!("no stored exercises, seeding defaults");
            let exercises = default_exercises();
            if let Err(e) = store.save_exercises(&exercises) {
                tracing::warn!(error = %e, "could not save default exercises");
            }
            exercises
        });

        let mut progress = ProgressState::from_stored(store.load_user());
        let elevated = store.load_elevated();

        if progress.rollover(clock.today()) {
            if let Some(user) = progress.user() {
                if let Err(e) = store.save_user(user) {
                    tracing::warn!(error = %e, "could not save progress after rollover");
                }
            }
        }

        Self {
            store,
            clock,
            gate,
            catalog: Catalog::from_parts(subjects, exercises),
            progress,
            elevated,
            selected: None,
            tips: TipBoard::default(),
            subject_form: SubjectDraft::default(),
            exercise_form: ExerciseDraft::default(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn user(&self) -> Option<&UserProgress> {
        self.progress.user()
    }

    pub fn is_registered(&self) -> bool {
        self.progress.is_registered()
    }

    pub fn is_elevated(&self) -> bool {
        self.elevated
    }

    pub fn gate(&self) -> &ElevationGate {
        &self.gate
    }

    pub fn selected_subject(&self) -> Option<&Subject> {
        self.selected
            .as_deref()
            .and_then(|name| self.catalog.subject(name))
    }

    /// Exercises of the selected subject, in catalog order
    pub fn visible_exercises(&self) -> Vec<&Exercise> {
        match &self.selected {
            Some(name) => self.catalog.exercises_for_subject(name).collect(),
            None => Vec::new(),
        }
    }

    pub fn tips(&self) -> &TipBoard {
        &self.tips
    }

    pub fn store(&self) -> &PortalStore<S> {
        &self.store
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Learner commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Register the learner and persist the new record
    pub fn register(&mut self, name: &str) -> Result<&UserProgress> {
        let today = self.clock.today();
        let user = self.progress.register(name, today)?;
        self.store.save_user(user)?;
        self.progress.user().ok_or(EduQuestError::NotRegistered)
    }

    /// Mark an exercise complete; persists only when points were awarded
    pub fn complete_exercise(&mut self, id: &ExerciseId) -> Result<Completion> {
        let outcome = self.progress.complete_exercise(id, &self.catalog);
        if outcome.changed() {
            self.save_user()?;
        }
        Ok(outcome)
    }

    /// Re-run the rollover check, for sessions that stay open past midnight
    pub fn refresh_day(&mut self) -> Result<bool> {
        let rolled = self.progress.rollover(self.clock.today());
        if rolled {
            self.save_user()?;
        }
        Ok(rolled)
    }

    /// Select a subject. Returns the ticket for the tip fetch to start.
    pub fn select_subject(&mut self, name: &str) -> Result<TipTicket> {
        self.require_registered()?;
        if self.catalog.subject(name).is_none() {
            return Err(EduQuestError::NotFound(format!("Subject '{}'", name)));
        }
        self.selected = Some(name.to_string());
        Ok(self.tips.begin(name))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.tips.clear();
    }

    /// Apply a fetched tip; stale answers are ignored
    pub fn resolve_tip(&mut self, ticket: &TipTicket, text: String) -> bool {
        self.tips.resolve(ticket, text)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Teacher mode
    // ─────────────────────────────────────────────────────────────────────────

    /// Unlock teacher mode with the shared password
    pub fn enter_elevated(&mut self, password: &str) -> Result<()> {
        self.require_registered()?;
        self.gate.verify(password)?;
        self.elevated = true;
        self.store.save_elevated(true)?;
        tracing::info!("teacher mode unlocked");
        Ok(())
    }

    pub fn leave_elevated(&mut self) -> Result<()> {
        self.elevated = false;
        self.store.save_elevated(false)
    }

    pub fn add_subject(&mut self, name: &str, icon: &str, color: &str) -> Result<&Subject> {
        self.require_elevated()?;
        self.commit(|portal| portal.catalog.add_subject(name, icon, color).map(|_| ()))?;
        self.catalog
            .subjects()
            .last()
            .ok_or_else(|| EduQuestError::NotFound("Subject".to_string()))
    }

    /// Add a subject from the form buffer and reset the form
    pub fn submit_subject_form(&mut self) -> Result<String> {
        let draft = self.subject_form.clone();
        let name = self.add_subject(&draft.name, &draft.icon, &draft.color)?.name.clone();
        self.subject_form = SubjectDraft::default();
        Ok(name)
    }

    /// Remove a subject, its exercises, and any completions pointing at them
    pub fn remove_subject(&mut self, name: &str, confirmation: Confirmation) -> Result<Vec<ExerciseId>> {
        self.require_elevated()?;
        self.commit(|portal| {
            let removed = portal.catalog.remove_subject(name, confirmation)?;
            if portal.selected.as_deref() == Some(name) {
                portal.clear_selection();
            }
            if portal.exercise_form.subject == name {
                portal.exercise_form.subject.clear();
            }
            portal.progress.forget(&removed);
            Ok(removed)
        })
    }

    pub fn add_exercise(&mut self, draft: &ExerciseDraft) -> Result<&Exercise> {
        self.require_elevated()?;
        self.commit(|portal| portal.catalog.add_exercise(draft).map(|_| ()))?;
        self.catalog
            .exercises()
            .last()
            .ok_or_else(|| EduQuestError::NotFound("Exercise".to_string()))
    }

    /// Add an exercise from the form buffer.
    ///
    /// On success the title, description and link are cleared while subject,
    /// difficulty and points stay for the next entry.
    pub fn submit_exercise_form(&mut self) -> Result<ExerciseId> {
        let draft = self.exercise_form.clone();
        let id = self.add_exercise(&draft)?.id.clone();
        self.exercise_form.clear_entry();
        Ok(id)
    }

    pub fn remove_exercise(&mut self, id: &ExerciseId, confirmation: Confirmation) -> Result<Exercise> {
        self.require_elevated()?;
        self.commit(|portal| {
            let removed = portal.catalog.remove_exercise(id, confirmation)?;
            portal.progress.forget(std::slice::from_ref(id));
            Ok(removed)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Every view except registration is gated behind a registered learner
    pub fn require_registered(&self) -> Result<()> {
        if self.progress.is_registered() {
            Ok(())
        } else {
            Err(EduQuestError::NotRegistered)
        }
    }

    /// Run a catalog edit and write the result through.
    ///
    /// A failed edit or a failed save leaves memory as it was before the
    /// call, and the previous collections are written back.
    fn commit<T>(&mut self, edit: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let before = self.snapshot();
        let value = match edit(self) {
            Ok(value) => value,
            Err(e) => {
                self.restore(before);
                return Err(e);
            }
        };

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "could not save catalog change, rolling back");
            self.restore(before);
            if let Err(e) = self.persist() {
                tracing::warn!(error = %e, "could not write back previous catalog");
            }
            return Err(e);
        }
        Ok(value)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            catalog: self.catalog.clone(),
            progress: self.progress.clone(),
            selected: self.selected.clone(),
            tips: self.tips.clone(),
            exercise_form: self.exercise_form.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.catalog = snapshot.catalog;
        self.progress = snapshot.progress;
        self.selected = snapshot.selected;
        self.tips = snapshot.tips;
        self.exercise_form = snapshot.exercise_form;
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save_subjects(self.catalog.subjects())?;
        self.store.save_exercises(self.catalog.exercises())?;
        self.save_user()
    }

    fn require_elevated(&self) -> Result<()> {
        if self.elevated {
            Ok(())
        } else {
            Err(EduQuestError::ElevationRequired)
        }
    }

    fn save_user(&mut self) -> Result<()> {
        match self.progress.user() {
            Some(user) => self.store.save_user(user),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{MemoryStore, SUBJECTS_KEY, USER_KEY};
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::rc::Rc;

    const PASSWORD: &str = "teach";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn portal() -> Portal<MemoryStore> {
        Portal::load(
            PortalStore::new(MemoryStore::new()),
            ElevationGate::with_password(PASSWORD),
            Clock::fixed(day(16)),
        )
    }

    /// Store whose subject writes fail while the shared flag is set
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_subjects: Rc<Cell<bool>>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if key == SUBJECTS_KEY && self.fail_subjects.get() {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    fn registered_teacher() -> Portal<MemoryStore> {
        let mut portal = portal();
        portal.register("Ana").unwrap();
        portal.enter_elevated(PASSWORD).unwrap();
        portal
    }

    #[test]
    fn test_load_seeds_defaults_and_starts_anonymous() {
        let portal = portal();
        assert!(!portal.is_registered());
        assert_eq!(portal.catalog().subjects().len(), 6);
        assert_eq!(portal.catalog().exercises().len(), 8);
        assert!(portal.store().load_subjects().is_some());
    }

    #[test]
    fn test_anonymous_is_blocked() {
        let mut portal = portal();
        assert!(matches!(
            portal.select_subject("Math"),
            Err(EduQuestError::NotRegistered)
        ));
        assert!(matches!(
            portal.enter_elevated(PASSWORD),
            Err(EduQuestError::NotRegistered)
        ));
        assert_eq!(
            portal.complete_exercise(&"m1".into()).unwrap(),
            Completion::NotRegistered
        );
    }

    #[test]
    fn test_rollover_runs_on_load() {
        let mut local = MemoryStore::new();
        let stored = UserProgress {
            name: "Ana".into(),
            total_points: 40,
            daily_goal: 3,
            completed_today_ids: vec!["m1".into()],
            last_active_date: day(15),
        };
        local
            .set(USER_KEY, &serde_json::to_string(&stored).unwrap())
            .unwrap();

        let portal = Portal::load(
            PortalStore::new(local),
            ElevationGate::default(),
            Clock::fixed(day(16)),
        );
        let user = portal.user().unwrap();
        assert!(user.completed_today_ids.is_empty());
        assert_eq!(user.total_points, 40);
        assert_eq!(user.last_active_date, day(16));
        assert_eq!(portal.store().load_user().unwrap().last_active_date, day(16));
    }

    #[test]
    fn test_mutations_require_teacher_mode() {
        let mut portal = portal();
        portal.register("Ana").unwrap();

        assert!(matches!(
            portal.add_subject("Art", "🎨", "bg-rose-500"),
            Err(EduQuestError::ElevationRequired)
        ));
        assert!(matches!(
            portal.remove_subject("Math", Confirmation::Confirmed),
            Err(EduQuestError::ElevationRequired)
        ));
        assert!(matches!(
            portal.remove_exercise(&"m1".into(), Confirmation::Confirmed),
            Err(EduQuestError::ElevationRequired)
        ));
        assert!(matches!(
            portal.enter_elevated("wrong"),
            Err(EduQuestError::AccessDenied)
        ));
        assert!(!portal.is_elevated());
        assert_eq!(portal.catalog().subjects().len(), 6);
    }

    #[test]
    fn test_leave_elevated() {
        let mut portal = registered_teacher();
        assert!(portal.store().load_elevated());
        portal.leave_elevated().unwrap();
        assert!(!portal.is_elevated());
        assert!(!portal.store().load_elevated());
    }

    #[test]
    fn test_remove_selected_subject_clears_selection_and_completions() {
        let mut portal = registered_teacher();
        portal.select_subject("Math").unwrap();
        portal.complete_exercise(&"m2".into()).unwrap();
        portal.complete_exercise(&"e1".into()).unwrap();

        let removed = portal
            .remove_subject("Math", Confirmation::Confirmed)
            .unwrap();
        assert_eq!(removed, vec![ExerciseId::from("m1"), ExerciseId::from("m2")]);
        assert!(portal.selected_subject().is_none());
        assert_eq!(portal.tips().subject(), None);

        let user = portal.user().unwrap();
        assert_eq!(user.completed_today_ids, vec![ExerciseId::from("e1")]);
        assert_eq!(user.total_points, 30);
        assert!(portal
            .store()
            .load_exercises()
            .unwrap()
            .iter()
            .all(|e| e.subject != "Math"));
    }

    #[test]
    fn test_remove_other_subject_keeps_selection() {
        let mut portal = registered_teacher();
        portal.select_subject("Math").unwrap();
        portal
            .remove_subject("History", Confirmation::Confirmed)
            .unwrap();
        assert_eq!(portal.selected_subject().map(|s| s.name.as_str()), Some("Math"));
    }

    #[test]
    fn test_subject_form_resets_after_submit() {
        let mut portal = registered_teacher();
        portal.subject_form.name = "Art".into();
        portal.subject_form.icon = "🎨".into();
        portal.subject_form.color = "bg-rose-500 text-rose-600".into();

        assert_eq!(portal.submit_subject_form().unwrap(), "Art");
        assert_eq!(portal.subject_form, SubjectDraft::default());
        assert_eq!(
            portal.catalog().subject("Art").unwrap().gradient,
            "from-rose-500 to-rose-600"
        );
    }

    #[test]
    fn test_exercise_form_keeps_subject_for_next_entry() {
        let mut portal = registered_teacher();
        portal.exercise_form = ExerciseDraft {
            title: "Memory Game".into(),
            description: "Pairs".into(),
            url: "https://example.com/memory".into(),
            subject: "Science".into(),
            points: 15,
            ..ExerciseDraft::default()
        };

        let id = portal.submit_exercise_form().unwrap();
        assert_eq!(portal.catalog().exercise(&id).unwrap().points, 15);
        assert!(portal.exercise_form.title.is_empty());
        assert!(portal.exercise_form.url.is_empty());
        assert_eq!(portal.exercise_form.subject, "Science");
        assert_eq!(portal.exercise_form.points, 15);
    }

    #[test]
    fn test_failed_exercise_submit_keeps_form() {
        let mut portal = registered_teacher();
        portal.exercise_form.title = "No link".into();
        portal.exercise_form.subject = "Math".into();

        assert!(portal.submit_exercise_form().is_err());
        assert_eq!(portal.exercise_form.title, "No link");
        assert_eq!(portal.catalog().exercises().len(), 8);
    }

    #[test]
    fn test_select_subject_starts_tip_and_lists_exercises() {
        let mut portal = portal();
        portal.register("Ana").unwrap();
        let ticket = portal.select_subject("Math").unwrap();
        assert!(portal.tips().is_loading());
        assert_eq!(portal.visible_exercises().len(), 2);

        assert!(portal.resolve_tip(&ticket, "Count on it!".into()));
        assert_eq!(portal.tips().text(), Some("Count on it!"));

        portal.clear_selection();
        assert!(portal.visible_exercises().is_empty());
        assert!(matches!(
            portal.select_subject("Nope"),
            Err(EduQuestError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_exercise_prunes_completion() {
        let mut portal = registered_teacher();
        portal.complete_exercise(&"h1".into()).unwrap();
        portal
            .remove_exercise(&"h1".into(), Confirmation::Confirmed)
            .unwrap();
        let user = portal.user().unwrap();
        assert!(user.completed_today_ids.is_empty());
        assert_eq!(user.total_points, 30);
    }

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let fail = Rc::new(Cell::new(false));
        let store = FlakyStore {
            inner: MemoryStore::new(),
            fail_subjects: Rc::clone(&fail),
        };
        let mut portal = Portal::load(
            PortalStore::new(store),
            ElevationGate::with_password(PASSWORD),
            Clock::fixed(day(16)),
        );
        portal.register("Ana").unwrap();
        portal.enter_elevated(PASSWORD).unwrap();
        portal.select_subject("Math").unwrap();
        portal.exercise_form.subject = "Math".into();
        portal.complete_exercise(&"m1".into()).unwrap();

        fail.set(true);
        assert!(matches!(
            portal.remove_subject("Math", Confirmation::Confirmed),
            Err(EduQuestError::Io(_))
        ));
        assert!(portal.catalog().subject("Math").is_some());
        assert_eq!(portal.catalog().exercise_count("Math"), 2);
        assert_eq!(
            portal.user().unwrap().completed_today_ids,
            vec![ExerciseId::from("m1")]
        );
        assert_eq!(portal.selected_subject().map(|s| s.name.as_str()), Some("Math"));
        assert_eq!(portal.exercise_form.subject, "Math");
        assert_eq!(portal.store().load_exercises().unwrap().len(), 8);

        assert!(portal.add_subject("Art", "🎨", "bg-rose-500").is_err());
        assert!(portal.catalog().subject("Art").is_none());

        fail.set(false);
        portal
            .remove_subject("Math", Confirmation::Confirmed)
            .unwrap();
        assert!(portal.user().unwrap().completed_today_ids.is_empty());
        assert!(portal.store().load_subjects().unwrap().iter().all(|s| s.name != "Math"));
    }
}
