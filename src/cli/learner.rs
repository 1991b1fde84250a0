//! Learner CLI command handlers

use std::path::PathBuf;

use crate::ai::{fetch_tip, tip_provider};
use crate::cli::browser;
use crate::cli::open_portal;
use crate::core::elevation::ElevationGate;
use crate::core::model::ExerciseId;
use crate::core::progress::Completion;
use crate::error::{EduQuestError, Result};

pub fn handle_register(data_dir: Option<PathBuf>, name: String) -> Result<()> {
    let mut portal = open_portal(data_dir, ElevationGate::default())?;
    let user = portal.register(&name)?;
    println!("Welcome, {}! 🎓", user.name);
    println!(
        "Your daily challenge: complete {} exercises. Run 'eduquest subjects' to begin.",
        user.daily_goal
    );
    Ok(())
}

pub fn handle_status(data_dir: Option<PathBuf>) -> Result<()> {
    let portal = open_portal(data_dir, ElevationGate::default())?;
    let user = portal.user().ok_or(EduQuestError::NotRegistered)?;
    let progress = portal.progress();

    println!("{} ({})", user.name, user.initial());
    println!("  Points:          {} ⭐", user.total_points);
    println!(
        "  Daily challenge: {}/{} ({}%)",
        progress.completed_count(),
        user.daily_goal,
        progress.progress_percent()
    );

    if progress.remaining_today() == 0 {
        println!("\n  🏆 Goal reached for today!");
    } else {
        println!(
            "\n  {} more to go today.",
            progress.remaining_today()
        );
    }
    Ok(())
}

pub fn handle_subjects(data_dir: Option<PathBuf>) -> Result<()> {
    let portal = open_portal(data_dir, ElevationGate::default())?;
    portal.require_registered()?;
    let catalog = portal.catalog();

    if catalog.subjects().is_empty() {
        println!("No subjects yet.");
        return Ok(());
    }

    println!("Subjects:\n");
    for subject in catalog.subjects() {
        let count = catalog.exercise_count(&subject.name);
        println!(
            "  {} {:<20} {} exercise{}",
            subject.icon,
            subject.name,
            count,
            if count == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

pub fn handle_exercises(data_dir: Option<PathBuf>, subject: String) -> Result<()> {
    let portal = open_portal(data_dir, ElevationGate::default())?;
    portal.require_registered()?;
    let catalog = portal.catalog();
    let found = catalog
        .subject(&subject)
        .ok_or_else(|| EduQuestError::NotFound(format!("Subject '{}'", subject)))?;

    let exercises: Vec<_> = catalog.exercises_for_subject(&found.name).collect();
    if exercises.is_empty() {
        println!("No exercises for {} yet.", found.name);
        return Ok(());
    }

    println!("{} {}:\n", found.icon, found.name);
    for exercise in exercises {
        let mark = if portal.progress().is_completed(&exercise.id) {
            "✓"
        } else {
            " "
        };
        println!(
            "  [{}] {:<16} {} ({}, +{} pts)",
            mark,
            exercise.id.as_str(),
            exercise.title,
            exercise.difficulty,
            exercise.points
        );
        if !exercise.description.is_empty() {
            println!("      {}", exercise.description);
        }
        println!("      {}", exercise.url);
    }
    Ok(())
}

pub fn handle_complete(data_dir: Option<PathBuf>, id: String) -> Result<()> {
    let mut portal = open_portal(data_dir, ElevationGate::default())?;
    let id = ExerciseId::new(id);

    match portal.complete_exercise(&id)? {
        Completion::Awarded(points) => {
            let title = portal
                .catalog()
                .exercise(&id)
                .map(|e| e.title.clone())
                .unwrap_or_default();
            let user = portal.user().ok_or(EduQuestError::NotRegistered)?;
            println!("✓ Completed '{}' (+{} points)", title, points);
            println!("  Total: {} points", user.total_points);
            if portal.progress().remaining_today() == 0 {
                println!("  🏆 Daily challenge complete!");
            }
        }
        Completion::AlreadyCompleted => {
            println!("Already completed today. No extra points.");
        }
        Completion::UnknownExercise => {
            return Err(EduQuestError::NotFound(format!("Exercise '{}'", id)));
        }
        Completion::NotRegistered => return Err(EduQuestError::NotRegistered),
    }
    Ok(())
}

pub fn handle_open(data_dir: Option<PathBuf>, id: String) -> Result<()> {
    let portal = open_portal(data_dir, ElevationGate::default())?;
    portal.require_registered()?;
    let id = ExerciseId::new(id);
    let exercise = portal
        .catalog()
        .exercise(&id)
        .ok_or_else(|| EduQuestError::NotFound(format!("Exercise '{}'", id)))?;

    if browser::open_link(&exercise.url)? {
        println!("Opened '{}' in your browser.", exercise.title);
        println!("Run 'eduquest complete {}' when you finish it.", exercise.id);
    } else {
        println!("Could not launch a browser. Open this link manually:");
        println!("  {}", exercise.url);
    }
    Ok(())
}

pub async fn handle_tip(data_dir: Option<PathBuf>, subject: String) -> Result<()> {
    let portal = open_portal(data_dir, ElevationGate::default())?;
    portal.require_registered()?;
    let found = portal
        .catalog()
        .subject(&subject)
        .ok_or_else(|| EduQuestError::NotFound(format!("Subject '{}'", subject)))?;

    let provider = tip_provider();
    let tip = fetch_tip(provider.as_ref(), &found.name).await;
    println!("💡 {}", tip);
    Ok(())
}
