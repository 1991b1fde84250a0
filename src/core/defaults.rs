//! Built-in starter catalog, used when the store has no subjects or exercises

use crate::core::model::{Difficulty, Exercise, ExerciseId, Subject};

/// Default subjects: (name, icon, color token)
const SUBJECTS: &[(&str, &str, &str)] = &[
    ("Math", "➗", "bg-blue-500"),
    ("Portuguese", "📚", "bg-rose-500"),
    ("English", "🌍", "bg-amber-500"),
    ("Science", "🔬", "bg-emerald-500"),
    ("Geography", "🗺️", "bg-indigo-500"),
    ("History", "🏛️", "bg-orange-500"),
];

/// Default exercises: (id, subject, title, description, url, difficulty, points)
const EXERCISES: &[(&str, &str, &str, &str, &str, Difficulty, u32)] = &[
    (
        "m1",
        "Math",
        "Fractions and Decimals",
        "Hands-on practice from Khan Academy.",
        "https://pt.khanacademy.org/math/arithmetic/fraction-arithmetic",
        Difficulty::Easy,
        10,
    ),
    (
        "m2",
        "Math",
        "Linear Equations",
        "Logic problems with one-variable equations.",
        "https://pt.khanacademy.org/math/algebra/one-variable-linear-equations",
        Difficulty::Medium,
        20,
    ),
    (
        "p1",
        "Portuguese",
        "New Spelling Rules",
        "Complete guide to accent marks.",
        "https://www.normaculta.com.br/acentuacao-grafica/",
        Difficulty::Easy,
        15,
    ),
    (
        "p2",
        "Portuguese",
        "Reading Comprehension",
        "Practice tests to improve reading.",
        "https://www.todamateria.com.br/exercicios-de-interpretacao-de-texto/",
        Difficulty::Medium,
        25,
    ),
    (
        "e1",
        "English",
        "Verb To Be & Present",
        "Grammar exercises for beginners.",
        "https://www.perfect-english-grammar.com/present-simple-exercise-1.html",
        Difficulty::Easy,
        10,
    ),
    (
        "s1",
        "Science",
        "The Water Cycle",
        "Understand the physical states of matter.",
        "https://www.todamateria.com.br/ciclo-da-agua/",
        Difficulty::Easy,
        12,
    ),
    (
        "g1",
        "Geography",
        "Globalization",
        "The connected world.",
        "https://brasilescola.uol.com.br/geografia/globalizacao.htm",
        Difficulty::Medium,
        22,
    ),
    (
        "h1",
        "History",
        "French Revolution",
        "Historical and social context.",
        "https://www.historiadomundo.com.br/idade-moderna/revolucao-francesa.htm",
        Difficulty::Hard,
        30,
    ),
];

pub fn default_subjects() -> Vec<Subject> {
    SUBJECTS
        .iter()
        .map(|(name, icon, color)| Subject::new(*name, *icon, *color))
        .collect()
}

pub fn default_exercises() -> Vec<Exercise> {
    EXERCISES
        .iter()
        .map(
            |(id, subject, title, description, url, difficulty, points)| Exercise {
                id: ExerciseId::from(*id),
                title: title.to_string(),
                description: description.to_string(),
                url: url.to_string(),
                subject: subject.to_string(),
                difficulty: *difficulty,
                points: *points,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_exercises_reference_default_subjects() {
        let subjects: HashSet<String> = default_subjects().into_iter().map(|s| s.name).collect();
        assert_eq!(subjects.len(), SUBJECTS.len());
        for exercise in default_exercises() {
            assert!(subjects.contains(&exercise.subject), "{}", exercise.subject);
            assert!(exercise.points > 0);
        }
    }

    #[test]
    fn test_default_ids_are_unique() {
        let ids: HashSet<ExerciseId> = default_exercises().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), EXERCISES.len());
    }
}
