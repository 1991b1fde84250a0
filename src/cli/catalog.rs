//! Teacher-mode CLI command handlers for subjects and exercises

use std::path::PathBuf;

use crate::cli::commands::{ExerciseCommand, SubjectCommand, TeacherAuth};
use crate::cli::{confirm, open_portal, prompt_line};
use crate::core::catalog::Confirmation;
use crate::core::elevation::ElevationGate;
use crate::core::model::{color_family, ExerciseDraft, ExerciseId, COLOR_OPTIONS};
use crate::core::portal::Portal;
use crate::core::store::FileStore;
use crate::error::{EduQuestError, Result};

/// Handle subject commands
pub fn handle_subject(data_dir: Option<PathBuf>, command: SubjectCommand) -> Result<()> {
    match command {
        SubjectCommand::Add {
            name,
            icon,
            color,
            auth,
        } => {
            let color = resolve_color(&color)?;
            let mut portal = teacher_portal(data_dir, auth)?;
            let subject = portal.add_subject(&name, &icon, &color)?;
            println!("✓ Added subject {} {}", subject.icon, subject.name);
            Ok(())
        }
        SubjectCommand::Remove { name, yes, auth } => {
            let mut portal = teacher_portal(data_dir, auth)?;
            let count = portal.catalog().exercise_count(&name);
            let confirmation = if yes || portal.catalog().subject(&name).is_none() {
                // Unknown names fall through to the NotFound error without prompting
                Confirmation::Confirmed
            } else {
                confirm(&format!(
                    "Remove subject '{}' and its {} exercise(s)?",
                    name, count
                ))?
            };

            match portal.remove_subject(&name, confirmation) {
                Ok(removed) => {
                    println!(
                        "✓ Removed subject '{}' ({} exercise(s) deleted)",
                        name,
                        removed.len()
                    );
                    Ok(())
                }
                Err(EduQuestError::Cancelled) => {
                    println!("Cancelled.");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    }
}

/// Handle exercise commands
pub fn handle_exercise(data_dir: Option<PathBuf>, command: ExerciseCommand) -> Result<()> {
    match command {
        ExerciseCommand::Add {
            title,
            url,
            subject,
            description,
            difficulty,
            points,
            auth,
        } => {
            let draft = ExerciseDraft {
                title,
                description,
                url,
                subject,
                difficulty,
                points,
            };
            let mut portal = teacher_portal(data_dir, auth)?;
            let exercise = portal.add_exercise(&draft)?;
            println!(
                "✓ Added '{}' to {} (id: {})",
                exercise.title, exercise.subject, exercise.id
            );
            Ok(())
        }
        ExerciseCommand::Remove { id, yes, auth } => {
            let mut portal = teacher_portal(data_dir, auth)?;
            let id = ExerciseId::new(id);
            let title = portal
                .catalog()
                .exercise(&id)
                .map(|e| e.title.clone())
                .ok_or_else(|| EduQuestError::NotFound(format!("Exercise '{}'", id)))?;

            let confirmation = if yes {
                Confirmation::Confirmed
            } else {
                confirm(&format!("Remove exercise '{}'?", title))?
            };

            match portal.remove_exercise(&id, confirmation) {
                Ok(removed) => {
                    println!("✓ Removed exercise '{}'", removed.title);
                    Ok(())
                }
                Err(EduQuestError::Cancelled) => {
                    println!("Cancelled.");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    }
}

/// Open the portal and unlock teacher mode for this invocation
fn teacher_portal(data_dir: Option<PathBuf>, auth: TeacherAuth) -> Result<Portal<FileStore>> {
    let gate = ElevationGate::from_credentials()?;
    if !gate.is_configured() {
        return Err(EduQuestError::ElevationNotConfigured);
    }

    let mut portal = open_portal(data_dir, gate)?;
    let password = match auth.password {
        Some(password) => password,
        None => prompt_line("Teacher password: ")?,
    };
    portal.enter_elevated(&password)?;
    Ok(portal)
}

/// Accept a color family name (`rose`) or a full color token
fn resolve_color(input: &str) -> Result<String> {
    let wanted = input.trim().to_lowercase();
    if wanted.starts_with("bg-") {
        return Ok(wanted);
    }

    COLOR_OPTIONS
        .iter()
        .find(|(token, label)| color_family(token) == wanted || label.to_lowercase() == wanted)
        .map(|(token, _)| token.to_string())
        .ok_or_else(|| {
            EduQuestError::InvalidInput(format!(
                "Unknown color '{}'. Available colors: {}",
                input,
                COLOR_OPTIONS
                    .iter()
                    .map(|(token, _)| color_family(token))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
}
