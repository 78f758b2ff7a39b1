//! poetry-voice: topic → Chinese poem → speech → playback.
//!
//! A console loop and an egui window share one pipeline: a Gemini call
//! writes the poem, a Gradio TTS app speaks it, and rodio plays it back.

pub mod app;
pub mod config;
pub mod console;
pub mod pipeline;
pub mod playback;
pub mod poem;
pub mod session;
pub mod speech;
