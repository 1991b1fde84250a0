//! Study tip fetching
//!
//! Providers return `Result`s; the UI only ever sees a string because
//! `fetch_tip` swaps any failure for a fixed fallback. `TipBoard` tracks the
//! tip for the current selection and drops answers that arrive after the
//! selection moved on.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

/// Shown whenever a tip cannot be produced
pub const FALLBACK_TIP: &str = "Learning is your superpower! ✨";

/// Markdown emphasis markers models like to add
static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__|`").unwrap());
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Source of motivational study tips
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TipProvider: Send + Sync {
    /// Generate a tip for a subject
    async fn tip(&self, subject: &str) -> Result<String>;
}

/// Fetch a tip, never failing: errors and empty answers become `FALLBACK_TIP`
pub async fn fetch_tip(provider: &dyn TipProvider, subject: &str) -> String {
    match provider.tip(subject).await {
        Ok(text) => {
            let cleaned = clean_tip(&text);
            if cleaned.is_empty() {
                tracing::debug!(subject, "empty tip from provider, using fallback");
                FALLBACK_TIP.to_string()
            } else {
                cleaned
            }
        }
        Err(e) => {
            tracing::debug!(subject, error = %e, "tip fetch failed, using fallback");
            FALLBACK_TIP.to_string()
        }
    }
}

/// Strip markdown emphasis, wrapping quotes and extra whitespace
pub fn clean_tip(text: &str) -> String {
    let without_emphasis = EMPHASIS_REGEX.replace_all(text, "");
    let collapsed = WHITESPACE_REGEX.replace_all(without_emphasis.trim(), " ");
    collapsed
        .trim_matches(|c| c == '"' || c == '“' || c == '”')
        .trim()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection tracking
// ─────────────────────────────────────────────────────────────────────────────

/// Identifies one fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipTicket {
    pub generation: u64,
    pub subject: String,
}

/// What the tip panel should show
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TipStatus {
    #[default]
    Idle,
    Loading,
    Ready(String),
}

/// Tip state for the currently selected subject
#[derive(Debug, Clone, Default)]
pub struct TipBoard {
    generation: u64,
    subject: Option<String>,
    status: TipStatus,
}

impl TipBoard {
    /// Start a fetch for a newly selected subject.
    ///
    /// The previous tip is discarded immediately so it is never shown under
    /// the new subject.
    pub fn begin(&mut self, subject: &str) -> TipTicket {
        self.generation += 1;
        self.subject = Some(subject.to_string());
        self.status = TipStatus::Loading;
        TipTicket {
            generation: self.generation,
            subject: subject.to_string(),
        }
    }

    /// Forget the selection; in-flight answers will be dropped
    pub fn clear(&mut self) {
        self.generation += 1;
        self.subject = None;
        self.status = TipStatus::Idle;
    }

    /// Apply a fetched tip if it still belongs to the current selection.
    ///
    /// Returns false for stale answers, which are discarded.
    pub fn resolve(&mut self, ticket: &TipTicket, text: String) -> bool {
        let current = ticket.generation == self.generation
            && self.subject.as_deref() == Some(ticket.subject.as_str());
        if !current {
            tracing::debug!(
                subject = %ticket.subject,
                generation = ticket.generation,
                "dropping stale tip"
            );
            return false;
        }
        self.status = TipStatus::Ready(text);
        true
    }

    pub fn status(&self) -> &TipStatus {
        &self.status
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == TipStatus::Loading
    }

    pub fn text(&self) -> Option<&str> {
        match &self.status {
            TipStatus::Ready(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use tokio::sync::{mpsc, Notify};

    use crate::error::EduQuestError;

    #[test]
    fn test_clean_tip() {
        assert_eq!(clean_tip("  \"**Keep going!** 🚀\"\n"), "Keep going! 🚀");
        assert_eq!(clean_tip("one\n\ntwo"), "one two");
        assert_eq!(clean_tip("   "), "");
    }

    #[tokio::test]
    async fn test_fetch_tip_passes_text_through() {
        let mut provider = MockTipProvider::new();
        provider
            .expect_tip()
            .times(1)
            .returning(|subject| Ok(format!("Practice {} a little every day!", subject)));

        assert_eq!(
            fetch_tip(&provider, "Math").await,
            "Practice Math a little every day!"
        );
    }

    #[tokio::test]
    async fn test_fetch_tip_falls_back_on_error_and_empty() {
        let mut failing = MockTipProvider::new();
        failing
            .expect_tip()
            .returning(|_| Err(EduQuestError::GeminiApi("quota".into())));
        assert_eq!(fetch_tip(&failing, "Math").await, FALLBACK_TIP);

        let mut empty = MockTipProvider::new();
        empty.expect_tip().returning(|_| Ok("  ".to_string()));
        assert_eq!(fetch_tip(&empty, "Math").await, FALLBACK_TIP);

        let mut unconfigured = MockTipProvider::new();
        unconfigured
            .expect_tip()
            .returning(|_| Err(EduQuestError::GeminiNotConfigured));
        assert_eq!(fetch_tip(&unconfigured, "Math").await, FALLBACK_TIP);
    }

    #[test]
    fn test_board_drops_stale_answer() {
        let mut board = TipBoard::default();
        let first = board.begin("Math");
        let second = board.begin("History");

        assert!(!board.resolve(&first, "math tip".into()));
        assert!(board.is_loading());

        assert!(board.resolve(&second, "history tip".into()));
        assert_eq!(board.text(), Some("history tip"));
    }

    #[test]
    fn test_board_revisit_refetches() {
        let mut board = TipBoard::default();
        let first = board.begin("Math");
        assert!(board.resolve(&first, "tip one".into()));

        let again = board.begin("Math");
        assert_ne!(first, again);
        assert!(board.is_loading());
        assert_eq!(board.text(), None);
        // The older Math answer cannot overwrite the new request either
        assert!(!board.resolve(&first, "tip one".into()));
    }

    #[test]
    fn test_board_clear_drops_inflight() {
        let mut board = TipBoard::default();
        let ticket = board.begin("Math");
        board.clear();
        assert!(!board.resolve(&ticket, "late".into()));
        assert_eq!(board.status(), &TipStatus::Idle);
        assert_eq!(board.subject(), None);
    }

    /// Provider whose answers are released manually, per subject
    struct GatedProvider {
        gates: HashMap<String, Arc<Notify>>,
    }

    #[async_trait]
    impl TipProvider for GatedProvider {
        async fn tip(&self, subject: &str) -> Result<String> {
            if let Some(gate) = self.gates.get(subject) {
                gate.notified().await;
            }
            Ok(format!("tip for {subject}"))
        }
    }

    #[tokio::test]
    async fn test_out_of_order_answers_keep_latest_selection() {
        let math_gate = Arc::new(Notify::new());
        let history_gate = Arc::new(Notify::new());
        let provider: Arc<dyn TipProvider> = Arc::new(GatedProvider {
            gates: HashMap::from([
                ("Math".to_string(), math_gate.clone()),
                ("History".to_string(), history_gate.clone()),
            ]),
        });

        let (tx, mut rx) = mpsc::channel(4);
        let mut board = TipBoard::default();

        for subject in ["Math", "History"] {
            let ticket = board.begin(subject);
            let provider = provider.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let text = fetch_tip(provider.as_ref(), &ticket.subject).await;
                let _ = tx.send((ticket, text)).await;
            });
        }

        // History answers first, then the late Math answer arrives
        history_gate.notify_one();
        let (ticket, text) = rx.recv().await.unwrap();
        assert!(board.resolve(&ticket, text));

        math_gate.notify_one();
        let (ticket, text) = rx.recv().await.unwrap();
        assert_eq!(ticket.subject, "Math");
        assert!(!board.resolve(&ticket, text));

        assert_eq!(board.text(), Some("tip for History"));
    }
}
