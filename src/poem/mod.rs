//! Poem generation module.
//!
//! This module provides:
//! * [`PoemGenerator`]: async trait implemented by all generator backends.
//! * [`GeminiGenerator`]: Google Gemini `generateContent` backend.
//! * [`PromptBuilder`]: builds the one-shot Chinese verse instruction.
//! * [`Poem`]: trimmed, non-empty poem text.
//! * [`GenerationError`]: error variants for generation calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use poetry_voice::config::{ApiKey, GenerationConfig};
//! use poetry_voice::poem::{GeminiGenerator, PoemGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let generator =
//!         GeminiGenerator::from_config(&GenerationConfig::default(), ApiKey::new("AIza..."));
//!
//!     match generator.generate("秋天").await {
//!         Ok(poem) => println!("{poem}"),
//!         Err(e) => eprintln!("no poem: {e}"),
//!     }
//! }
//! ```

pub mod gemini;
pub mod generator;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use gemini::GeminiGenerator;
pub use generator::{GenerationError, Poem, PoemGenerator};
pub use prompt::PromptBuilder;

#[cfg(test)]
pub use generator::MockPoemGenerator;
