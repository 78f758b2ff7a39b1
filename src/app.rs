//! Poetry front end: egui/eframe application.
//!
//! # Architecture
//!
//! [`PoetryApp`] is the top-level [`eframe::App`].  It owns three channel
//! endpoints:
//!
//! * `topic_tx`   : topics for the orchestrator task ([`PipelineOrchestrator::serve`]).
//! * `event_rx`   : [`PipelineEvent`]s coming back from that task.
//! * `playback_tx`: artifacts for the `audio-playback` thread.
//!
//! | State | Visual |
//! |-------|--------|
//! | `Idle` | topic field, "生成" enabled |
//! | `Generating` / `Synthesizing` | spinner + status label, "生成" disabled |
//! | `Done` | poem text, "播放" enabled when audio is present |
//!
//! [`PipelineOrchestrator::serve`]: crate::pipeline::PipelineOrchestrator::serve

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::UiConfig;
use crate::pipeline::{PipelineEvent, PipelineState};
use crate::speech::AudioArtifact;

/// System fonts tried, in order, for CJK glyphs.
const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

// ---------------------------------------------------------------------------
// PoetryApp
// ---------------------------------------------------------------------------

/// eframe application: topic in, poem and audio out.
pub struct PoetryApp {
    // ── Request state ────────────────────────────────────────────────────
    pub state: PipelineState,
    /// Text of the topic field.
    pub topic: String,
    /// Poem of the last finished (or in-flight) request.
    pub poem: Option<String>,
    /// Audio of the last finished request.
    pub audio: Option<AudioArtifact>,
    /// Shown under the poem when a stage produced nothing.
    pub notice: Option<String>,

    spinner_phase: f32,

    // ── Channels ─────────────────────────────────────────────────────────
    topic_tx: mpsc::Sender<String>,
    event_rx: mpsc::Receiver<PipelineEvent>,
    playback_tx: std::sync::mpsc::Sender<AudioArtifact>,

    config: UiConfig,
}

impl PoetryApp {
    pub fn new(
        topic_tx: mpsc::Sender<String>,
        event_rx: mpsc::Receiver<PipelineEvent>,
        playback_tx: std::sync::mpsc::Sender<AudioArtifact>,
        config: UiConfig,
    ) -> Self {
        Self {
            state: PipelineState::Idle,
            topic: String::new(),
            poem: None,
            audio: None,
            notice: None,
            spinner_phase: 0.0,
            topic_tx,
            event_rx,
            playback_tx,
            config,
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Send the current topic to the orchestrator.
    ///
    /// Returns `false` when a request is already in flight or the
    /// orchestrator is gone.
    pub fn submit(&mut self) -> bool {
        if self.state.is_busy() {
            return false;
        }

        match self.topic_tx.try_send(self.topic.clone()) {
            Ok(()) => {
                self.state = PipelineState::Generating;
                self.poem = None;
                self.audio = None;
                self.notice = None;
                true
            }
            Err(e) => {
                log::error!("ui: cannot submit topic: {e}");
                self.notice = Some("后台服务不可用".into());
                false
            }
        }
    }

    /// Hand the current artifact to the playback thread.
    pub fn play(&mut self) -> bool {
        let Some(audio) = self.audio.clone() else {
            return false;
        };
        if let Err(e) = self.playback_tx.send(audio) {
            log::warn!("ui: playback thread is gone: {e}");
            self.notice = Some("音频播放不可用".into());
            return false;
        }
        true
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending pipeline events (non-blocking).
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::StateChanged(state) => self.state = state,
            PipelineEvent::PoemReady(poem) => self.poem = Some(poem.into_string()),
            PipelineEvent::Finished(result) => {
                let (poem, audio) = result.into_parts();
                self.notice = match (&poem, &audio) {
                    (None, _) => Some("诗歌生成失败，请重试".into()),
                    (Some(_), None) => Some("语音合成失败".into()),
                    _ => None,
                };
                self.poem = poem.map(|p| p.into_string());
                self.audio = audio;
                self.state = PipelineState::Done;
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    fn draw_input(&mut self, ui: &mut egui::Ui) {
        let busy = self.state.is_busy();

        ui.horizontal(|ui| {
            let width = ui.available_width() - 60.0;
            let field = ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut self.topic)
                    .hint_text("请输入诗歌主题")
                    .desired_width(width),
            );
            let entered =
                field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let clicked = ui
                .add_enabled(!busy, egui::Button::new(egui::RichText::new("生成").size(14.0)))
                .clicked();

            if clicked || entered {
                self.submit();
            }
        });
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        let text = if self.state.is_busy() {
            format!("{} {}", self.spinner_char(), self.state.label())
        } else {
            self.state.label().to_string()
        };
        ui.label(
            egui::RichText::new(text)
                .color(egui::Color32::from_rgb(68, 136, 255))
                .size(12.0),
        );
    }

    fn draw_poem(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 40.0)
            .show(ui, |ui| match &self.poem {
                Some(poem) => {
                    ui.label(egui::RichText::new(poem.as_str()).size(self.config.poem_font_size));
                }
                None => {
                    ui.label(
                        egui::RichText::new("诗歌将显示在这里")
                            .color(egui::Color32::from_rgb(120, 120, 120))
                            .size(13.0),
                    );
                }
            });

        if let Some(notice) = &self.notice {
            ui.label(
                egui::RichText::new(notice.as_str())
                    .color(egui::Color32::from_rgb(255, 136, 68))
                    .size(12.0),
            );
        }

        ui.horizontal(|ui| {
            let can_play = self.audio.is_some() && !self.state.is_busy();
            if ui
                .add_enabled(can_play, egui::Button::new(egui::RichText::new("播放").size(13.0)))
                .clicked()
            {
                self.play();
            }
            if ui
                .add_enabled(
                    self.poem.is_some(),
                    egui::Button::new(egui::RichText::new("复制").size(13.0)),
                )
                .clicked()
            {
                if let Some(poem) = &self.poem {
                    ctx.copy_text(poem.clone());
                }
            }
        });
    }

    fn spinner_char(&self) -> char {
        let chars = ['|', '/', '-', '\\'];
        chars[(self.spinner_phase as usize) % chars.len()]
    }
}

/// Register the first CJK system font found as the preferred proportional
/// font.  Without one, Chinese text renders as boxes.
pub fn install_cjk_fonts(ctx: &egui::Context) {
    let Some((path, bytes)) = CJK_FONT_CANDIDATES
        .iter()
        .find_map(|p| std::fs::read(p).ok().map(|b| (*p, b)))
    else {
        log::warn!("ui: no CJK font found; Chinese text may not render");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .insert(0, "cjk".to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("ui: loaded CJK font from {path}");
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for PoetryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();

        if self.state.is_busy() {
            self.spinner_phase = (self.spinner_phase + 0.08) % 4.0;
            ctx.request_repaint_after(Duration::from_millis(66));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("诗歌生成器");
            ui.add_space(6.0);
            self.draw_input(ui);
            self.draw_status(ui);
            ui.separator();
            self.draw_poem(ui, ctx);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("ui: window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
