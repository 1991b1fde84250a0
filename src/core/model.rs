//! Domain types: subjects, exercises and learner progress
//!
//! Field names serialize in camelCase so stored data stays compatible with
//! catalogs exported from the web version of the portal.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EduQuestError;

/// Icon used when a subject is created without one
pub const DEFAULT_SUBJECT_ICON: &str = "📖";

/// Color token used when a subject is created without one
pub const DEFAULT_SUBJECT_COLOR: &str = "bg-blue-500";

/// Daily goal assigned to every new registration
pub const DEFAULT_DAILY_GOAL: u32 = 3;

/// Point value pre-filled in the add-exercise form
pub const DEFAULT_EXERCISE_POINTS: u32 = 10;

/// Color choices offered by the add-subject form: (token, label)
pub const COLOR_OPTIONS: &[(&str, &str)] = &[
    ("bg-blue-500 text-blue-600", "Blue"),
    ("bg-rose-500 text-rose-600", "Rose"),
    ("bg-emerald-500 text-emerald-600", "Green"),
    ("bg-amber-500 text-amber-600", "Yellow"),
    ("bg-indigo-500 text-indigo-600", "Purple"),
];

// ─────────────────────────────────────────────────────────────────────────────
// Subjects
// ─────────────────────────────────────────────────────────────────────────────

/// A named category of study material with a display theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique name, also the foreign key used by exercises
    pub name: String,
    /// Display icon (usually an emoji)
    pub icon: String,
    /// Color token, e.g. `bg-blue-500`
    pub color: String,
    /// Two-stop gradient token derived from `color`
    pub gradient: String,
}

impl Subject {
    /// Build a subject, deriving its gradient from the color token
    pub fn new(name: impl Into<String>, icon: impl Into<String>, color: impl Into<String>) -> Self {
        let color = color.into();
        Self {
            name: name.into(),
            icon: icon.into(),
            gradient: gradient_for(&color),
            color,
        }
    }

    /// Color family of this subject (`blue`, `rose`, ...)
    pub fn color_family(&self) -> &str {
        color_family(&self.color)
    }
}

/// Extract the color family from a color token.
///
/// The family is the second `-`-separated segment (`bg-rose-500` → `rose`).
/// Tokens without one fall back to `blue`.
pub fn color_family(token: &str) -> &str {
    match token.split('-').nth(1) {
        Some(family) if !family.trim().is_empty() => family.trim(),
        _ => "blue",
    }
}

/// Derive the two-stop gradient token for a color token
pub fn gradient_for(token: &str) -> String {
    let family = color_family(token);
    format!("from-{family}-500 to-{family}-600")
}

// ─────────────────────────────────────────────────────────────────────────────
// Exercises
// ─────────────────────────────────────────────────────────────────────────────

/// Unique exercise identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(String);

impl ExerciseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExerciseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Exercise difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "Fácil")]
    Easy,
    #[default]
    #[serde(alias = "Médio")]
    Medium,
    #[serde(alias = "Difícil")]
    Hard,
}

impl Difficulty {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// All difficulties, easiest first
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// The next difficulty, wrapping around (used by form cycling)
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = EduQuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "fácil" | "facil" => Ok(Difficulty::Easy),
            "medium" | "médio" | "medio" => Ok(Difficulty::Medium),
            "hard" | "difícil" | "dificil" => Ok(Difficulty::Hard),
            other => Err(EduQuestError::InvalidInput(format!(
                "Invalid difficulty '{}'. Expected one of: easy, medium, hard",
                other
            ))),
        }
    }
}

/// A single linked activity belonging to one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    /// Owning subject name
    pub subject: String,
    pub difficulty: Difficulty,
    pub points: u32,
}

/// Input buffer for the add-exercise form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseDraft {
    pub title: String,
    pub description: String,
    pub url: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub points: u32,
}

impl Default for ExerciseDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            url: String::new(),
            subject: String::new(),
            difficulty: Difficulty::default(),
            points: DEFAULT_EXERCISE_POINTS,
        }
    }
}

impl ExerciseDraft {
    /// Clear the per-exercise fields, keeping subject, difficulty and points
    /// so several links can be entered under the same subject in a row.
    pub fn clear_entry(&mut self) {
        self.title.clear();
        self.description.clear();
        self.url.clear();
    }
}

/// Input buffer for the add-subject form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDraft {
    pub name: String,
    pub icon: String,
    pub color: String,
}

impl Default for SubjectDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            icon: DEFAULT_SUBJECT_ICON.to_string(),
            color: DEFAULT_SUBJECT_COLOR.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Progress
// ─────────────────────────────────────────────────────────────────────────────

/// The learner's accumulated points and daily completions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub name: String,
    pub total_points: u32,
    pub daily_goal: u32,
    /// Exercises completed today, in completion order, without duplicates
    pub completed_today_ids: Vec<ExerciseId>,
    pub last_active_date: NaiveDate,
}

impl UserProgress {
    /// First letter of the name, upper-cased, for avatars
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_from_color_token() {
        assert_eq!(gradient_for("bg-rose-500"), "from-rose-500 to-rose-600");
        assert_eq!(
            gradient_for("bg-emerald-500 text-emerald-600"),
            "from-emerald-500 to-emerald-600"
        );
        assert_eq!(gradient_for("plain"), "from-blue-500 to-blue-600");
        assert_eq!(gradient_for(""), "from-blue-500 to-blue-600");
    }

    #[test]
    fn test_subject_new_derives_gradient() {
        let subject = Subject::new("Art", "🎨", "bg-amber-500");
        assert_eq!(subject.gradient, "from-amber-500 to-amber-600");
        assert_eq!(subject.color_family(), "amber");
    }

    #[test]
    fn test_difficulty_accepts_portuguese_labels() {
        let d: Difficulty = serde_json::from_str("\"Difícil\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
        let d: Difficulty = serde_json::from_str("\"Easy\"").unwrap();
        assert_eq!(d, Difficulty::Easy);
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"Medium\"");
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("médio".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_exercise_draft_clear_entry_keeps_subject() {
        let mut draft = ExerciseDraft {
            title: "Fractions".into(),
            description: "Practice".into(),
            url: "https://example.com".into(),
            subject: "Math".into(),
            difficulty: Difficulty::Hard,
            points: 30,
        };
        draft.clear_entry();
        assert!(draft.title.is_empty());
        assert!(draft.description.is_empty());
        assert!(draft.url.is_empty());
        assert_eq!(draft.subject, "Math");
        assert_eq!(draft.difficulty, Difficulty::Hard);
        assert_eq!(draft.points, 30);
    }

    #[test]
    fn test_user_progress_camel_case() {
        let progress = UserProgress {
            name: "Ana".into(),
            total_points: 20,
            daily_goal: 3,
            completed_today_ids: vec![ExerciseId::from("m2")],
            last_active_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        };
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"totalPoints\":20"));
        assert!(json.contains("\"completedTodayIds\":[\"m2\"]"));
        assert!(json.contains("\"lastActiveDate\":\"2026-10-16\""));
        assert_eq!(progress.initial(), "A");
    }
}
