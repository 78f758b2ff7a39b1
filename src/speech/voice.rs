//! Fixed synthesis parameters.
//!
//! [`VoiceSettings`] enumerates every option sent to the TTS endpoint.  None
//! of them depend on the text being spoken.  The optional [`StyleSettings`]
//! block enables the richer variant (reference audio + style prompt).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// How the style prompt steers the voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptMode {
    /// Steer with `style_text`.
    Text,
    /// Steer with the reference audio clip.
    Audio,
}

impl PromptMode {
    /// The radio-button label the Gradio app expects.
    pub fn label(&self) -> &'static str {
        match self {
            PromptMode::Text => "Text prompt",
            PromptMode::Audio => "Audio prompt",
        }
    }
}

/// Reference-audio / style-prompt options of the extended TTS endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSettings {
    /// URI of a reference speech sample.
    pub reference_audio: String,
    pub prompt_mode: PromptMode,
    /// Free-text style description, used in [`PromptMode::Text`].
    pub style_text: String,
    /// Blend weight of the style prompt (0.0 – 1.0).
    pub style_weight: f64,
}

/// Synthesis configuration sent with every TTS request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Target speaker identity as listed by the TTS app.
    pub speaker: String,
    /// SDP/DP mix ratio; higher values vary rhythm more.
    pub sdp_ratio: f64,
    /// Emotion intensity (noise scale).
    pub emotion: f64,
    /// Phoneme duration noise (noise scale w).
    pub phoneme_length: f64,
    /// Speech-rate (length scale); larger is slower.
    pub speed: f64,
    /// Target language code (`"ZH"`, `"JP"`, `"EN"`).
    pub language: String,
    /// `Some` switches to the extended endpoint signature.
    pub style: Option<StyleSettings>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            speaker: "东雪莲".into(),
            sdp_ratio: 0.3,
            emotion: 0.9,
            phoneme_length: 0.5,
            speed: 2.0,
            language: "ZH".into(),
            style: None,
        }
    }
}

impl VoiceSettings {
    /// Positional argument list for the Gradio `data` array.
    ///
    /// Base order: text, speaker, sdp ratio, emotion, phoneme length, speed,
    /// language.  With a style block, reference audio, prompt mode, style
    /// text and style weight follow.
    pub fn request_data(&self, text: &str) -> Vec<Value> {
        let mut data = vec![
            json!(text),
            json!(self.speaker),
            json!(self.sdp_ratio),
            json!(self.emotion),
            json!(self.phoneme_length),
            json!(self.speed),
            json!(self.language),
        ];

        if let Some(style) = &self.style {
            data.push(json!({ "name": style.reference_audio, "data": null }));
            data.push(json!(style.prompt_mode.label()));
            data.push(json!(style.style_text));
            data.push(json!(style.style_weight));
        }

        data
    }
}
