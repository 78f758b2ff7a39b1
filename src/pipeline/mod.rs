//! Pipeline orchestrator module.
//!
//! Wires the theme → poem → speech (→ playback) sequence and exposes the
//! request state that the UI renders.
//!
//! # Architecture
//!
//! ```text
//! console:  stdin line ─▶ Runtime::block_on(compose_and_play) ─▶ log result
//!
//! front end:
//!   topic (mpsc) ─▶ PipelineOrchestrator::serve()  ← tokio task
//!                         │
//!                         └─ PipelineEvent (mpsc) ─▶ egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use poetry_voice::pipeline::PipelineOrchestrator;
//!
//! # use poetry_voice::poem::PoemGenerator;
//! # use poetry_voice::speech::SpeechSynthesizer;
//! # fn make_generator() -> Arc<dyn PoemGenerator> { unimplemented!() }
//! # fn make_synthesizer() -> Arc<dyn SpeechSynthesizer> { unimplemented!() }
//! #[tokio::main]
//! async fn main() {
//!     let (event_tx, mut event_rx) = mpsc::channel(32);
//!     let (topic_tx, topic_rx) = mpsc::channel(4);
//!
//!     let orchestrator = PipelineOrchestrator::new(make_generator(), make_synthesizer())
//!         .with_events(event_tx);
//!     tokio::spawn(orchestrator.serve(topic_rx));
//!
//!     topic_tx.send("秋天".to_string()).await.unwrap();
//!     while let Some(event) = event_rx.recv().await {
//!         println!("{event:?}");
//!     }
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::PipelineOrchestrator;
pub use state::{PipelineEvent, PipelineResult, PipelineState};
