//! Prompt templates for AI generation

/// Generate the prompt for a motivational study tip
pub fn study_tip_prompt(subject: &str, max_chars: u32) -> String {
    format!(
        "Give a quick, motivational study tip about {subject}. \
         Maximum {max_chars} characters. Use emojis. \
         Reply with the tip only."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_tip_prompt_mentions_subject_and_budget() {
        let prompt = study_tip_prompt("History", 100);
        assert!(prompt.contains("History"));
        assert!(prompt.contains("Maximum 100 characters"));
    }
}
