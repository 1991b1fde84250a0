//! Subject and exercise catalog
//!
//! Owns both collections. Every operation either applies fully or returns an
//! error and leaves the catalog untouched.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::model::{
    Exercise, ExerciseDraft, ExerciseId, Subject, DEFAULT_SUBJECT_COLOR, DEFAULT_SUBJECT_ICON,
};
use crate::error::{EduQuestError, Result};

/// Explicit answer to a destructive prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn from_bool(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }

    fn require(self) -> Result<()> {
        match self {
            Confirmation::Confirmed => Ok(()),
            Confirmation::Declined => Err(EduQuestError::Cancelled),
        }
    }
}

/// In-memory catalog of subjects and exercises, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    subjects: Vec<Subject>,
    exercises: Vec<Exercise>,
    /// Last generated numeric id, keeps ids increasing within a process
    last_id: u64,
}

impl Catalog {
    /// Catalog with no subjects or exercises
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog restored from stored collections
    pub fn from_parts(subjects: Vec<Subject>, exercises: Vec<Exercise>) -> Self {
        Self {
            subjects,
            exercises,
            last_id: 0,
        }
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn exercise(&self, id: &ExerciseId) -> Option<&Exercise> {
        self.exercises.iter().find(|e| &e.id == id)
    }

    /// Exercises of a subject, in insertion order
    pub fn exercises_for_subject<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Exercise> + 'a {
        self.exercises.iter().filter(move |e| e.subject == name)
    }

    pub fn exercise_count(&self, name: &str) -> usize {
        self.exercises_for_subject(name).count()
    }

    /// Add a subject. Names are trimmed and must be unique.
    pub fn add_subject(&mut self, name: &str, icon: &str, color: &str) -> Result<&Subject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EduQuestError::validation("Give the subject a name."));
        }
        if self.subject(name).is_some() {
            return Err(EduQuestError::DuplicateSubject(name.to_string()));
        }

        let icon = non_empty_or(icon, DEFAULT_SUBJECT_ICON);
        let color = non_empty_or(color, DEFAULT_SUBJECT_COLOR);

        tracing::info!(name, color, "adding subject");
        self.subjects.push(Subject::new(name, icon, color));
        self.subjects
            .last()
            .ok_or_else(|| EduQuestError::NotFound(format!("Subject '{}'", name)))
    }

    /// Remove a subject and every exercise filed under it.
    ///
    /// Returns the ids of the removed exercises.
    pub fn remove_subject(&mut self, name: &str, confirmation: Confirmation) -> Result<Vec<ExerciseId>> {
        if self.subject(name).is_none() {
            return Err(EduQuestError::NotFound(format!("Subject '{}'", name)));
        }
        confirmation.require()?;

        let removed: Vec<ExerciseId> = self
            .exercises_for_subject(name)
            .map(|e| e.id.clone())
            .collect();

        self.subjects.retain(|s| s.name != name);
        self.exercises.retain(|e| e.subject != name);

        tracing::info!(name, cascaded = removed.len(), "removed subject");
        Ok(removed)
    }

    /// Add an exercise from a form draft
    pub fn add_exercise(&mut self, draft: &ExerciseDraft) -> Result<&Exercise> {
        let title = draft.title.trim();
        let url = draft.url.trim();
        let subject = draft.subject.trim();

        if title.is_empty() || url.is_empty() || subject.is_empty() {
            return Err(EduQuestError::validation(
                "Fill in the required fields: title, link and subject.",
            ));
        }
        if draft.points == 0 {
            return Err(EduQuestError::validation("Points must be greater than zero."));
        }
        if self.subject(subject).is_none() {
            return Err(EduQuestError::UnknownSubject(subject.to_string()));
        }

        let id = self.next_id();
        tracing::info!(%id, title, subject, "adding exercise");
        self.exercises.push(Exercise {
            id,
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            url: url.to_string(),
            subject: subject.to_string(),
            difficulty: draft.difficulty,
            points: draft.points,
        });
        self.exercises
            .last()
            .ok_or_else(|| EduQuestError::NotFound("Exercise".to_string()))
    }

    /// Remove a single exercise
    pub fn remove_exercise(&mut self, id: &ExerciseId, confirmation: Confirmation) -> Result<Exercise> {
        let index = self
            .exercises
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| EduQuestError::NotFound(format!("Exercise '{}'", id)))?;
        confirmation.require()?;

        let exercise = self.exercises.remove(index);
        tracing::info!(%id, "removed exercise");
        Ok(exercise)
    }

    /// Generate a time-derived id that is unique in this catalog and larger
    /// than any id generated earlier in this process.
    fn next_id(&mut self) -> ExerciseId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut candidate = now.max(self.last_id + 1);
        while self.exercises.iter().any(|e| e.id.as_str() == candidate.to_string()) {
            candidate += 1;
        }
        self.last_id = candidate;
        ExerciseId::new(candidate.to_string())
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}
