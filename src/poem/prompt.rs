//! Prompt builder for classical Chinese verse.
//!
//! The instruction asks for Simplified Chinese, evocative imagery, an
//! emotional tone, a 五言绝句 or 七言律诗 form, and a bare title + body with
//! no preamble.  The core never checks that the model honoured any of this.

/// Builds the single instruction sent to the language model.
///
/// ```rust
/// use poetry_voice::poem::PromptBuilder;
///
/// let prompt = PromptBuilder::new().build("秋天");
/// assert!(prompt.contains("「秋天」"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    _private: (),
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed `topic` verbatim.  An empty topic is not rejected here.
    pub fn build(&self, topic: &str) -> String {
        format!(
            "请以「{topic}」为主题，用简体中文创作一首优美的中文诗歌。\
             诗歌应当意境深远，语言优美，富有感情。\
             请不要包含任何前言后语，直接返回诗歌的标题和内容。\
             请创作一首五言绝句或七言律诗"
        )
    }
}
