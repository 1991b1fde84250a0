//! AI integration module
//!
//! This module provides Gemini AI integration for generating motivational
//! study tips, plus the selection tracking that keeps late answers from
//! landing on the wrong subject.

pub mod gemini;
pub mod prompts;
pub mod tips;

pub use gemini::{tip_provider, GeminiClient};
pub use tips::{fetch_tip, TipBoard, TipProvider, TipStatus, TipTicket, FALLBACK_TIP};
