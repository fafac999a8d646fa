//! Illustrations of the secret word.
//!
//! Providers never fail: any error from the model, or a call that outlives
//! its deadline, is replaced by a placeholder that embeds the word.

use async_trait::async_trait;
use derive_getters::Getters;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::game::Rendering;
use crate::llm_client::LlmClient;

/// Produces the rendering shown to players.
#[async_trait]
pub trait DrawingProvider: Send + Sync + std::fmt::Debug {
    /// Renders `word`. Infallible: failures yield a placeholder.
    async fn render(&self, word: &str) -> Rendering;
}

/// Canvas size and call deadline for generated drawings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_new::new)]
pub struct DrawingOptions {
    width: u32,
    height: u32,
    timeout: Duration,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self::new(400, 400, Duration::from_secs(20))
    }
}

/// Deterministic fallback drawing: a framed card naming the word.
#[instrument(skip(word))]
pub fn placeholder_svg(word: &str, width: u32, height: u32) -> String {
    format!(
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
        <rect x="10" y="10" width="{iw}" height="{ih}" fill="none" stroke="black" stroke-width="2"/>
        <text x="{cx}" y="{cy}" text-anchor="middle" font-size="20" fill="black">AI Drawing</text>
        <text x="{cx}" y="{cy2}" text-anchor="middle" font-size="16" fill="gray">Word: {word}</text>
    </svg>"#,
        w = width,
        h = height,
        iw = width.saturating_sub(20),
        ih = height.saturating_sub(20),
        cx = width / 2,
        cy = height / 2,
        cy2 = height / 2 + 30,
        word = word,
    )
}

/// Wraps model output in an `<svg>` root when it lacks one.
#[instrument(skip(content))]
pub fn ensure_svg_root(content: &str, width: u32, height: u32) -> String {
    let content = content.trim();
    if content.starts_with("<svg") {
        return content.to_string();
    }
    debug!("Model output lacks <svg> root, wrapping");
    format!(
        r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">{content}</svg>"#
    )
}

/// Always returns [`placeholder_svg`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDrawing {
    options: DrawingOptions,
}

impl PlaceholderDrawing {
    /// Creates a placeholder provider for the given canvas.
    pub fn new(options: DrawingOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DrawingProvider for PlaceholderDrawing {
    #[instrument(skip(self))]
    async fn render(&self, word: &str) -> Rendering {
        Rendering::from(placeholder_svg(word, self.options.width, self.options.height))
    }
}

/// Asks a chat model to draw the word as SVG.
#[derive(Debug, Clone)]
pub struct LlmDrawingProvider {
    client: LlmClient,
    options: DrawingOptions,
}

impl LlmDrawingProvider {
    /// Creates a provider backed by `client`.
    #[instrument(skip(client))]
    pub fn new(client: LlmClient, options: DrawingOptions) -> Self {
        info!(model = %client.config().model(), "Creating LLM drawing provider");
        Self { client, options }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are an AI that creates simple SVG drawings for a Pictionary game. \
             Create a simple, clear SVG that represents the given word. \
             The SVG should be {}x{} pixels and use basic shapes and lines. \
             Return ONLY the SVG code, no explanations.",
            self.options.width, self.options.height
        )
    }
}

#[async_trait]
impl DrawingProvider for LlmDrawingProvider {
    #[instrument(skip(self))]
    async fn render(&self, word: &str) -> Rendering {
        let system_prompt = self.system_prompt();
        let user_message = format!("Draw a simple SVG representation of: {}", word);
        let call = self.client.generate(&system_prompt, &user_message);

        let (width, height) = (self.options.width, self.options.height);
        match tokio::time::timeout(self.options.timeout, call).await {
            Ok(Ok(content)) => {
                info!(length = content.len(), "Drawing generated");
                Rendering::from(ensure_svg_root(&content, width, height))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Drawing generation failed, using placeholder");
                Rendering::from(placeholder_svg(word, width, height))
            }
            Err(_) => {
                warn!(timeout = ?self.options.timeout, "Drawing generation timed out, using placeholder");
                Rendering::from(placeholder_svg(word, width, height))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_embeds_word_and_size() {
        let svg = placeholder_svg("cat", 400, 400);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Word: cat"));
        assert!(svg.contains(r#"width="380""#));
        assert!(svg.contains(r#"x="200" y="230""#));
    }

    #[test]
    fn placeholder_is_deterministic() {
        assert_eq!(placeholder_svg("tree", 300, 200), placeholder_svg("tree", 300, 200));
    }

    #[test]
    fn svg_root_is_kept() {
        let svg = "  <svg><circle r=\"5\"/></svg>\n";
        assert_eq!(ensure_svg_root(svg, 400, 400), "<svg><circle r=\"5\"/></svg>");
    }

    #[test]
    fn bare_shapes_are_wrapped() {
        let wrapped = ensure_svg_root("<circle r=\"5\"/>", 100, 50);
        assert!(wrapped.starts_with(r#"<svg width="100" height="50""#));
        assert!(wrapped.ends_with("<circle r=\"5\"/></svg>"));
    }

    #[tokio::test]
    async fn placeholder_provider_renders_placeholder() {
        let provider = PlaceholderDrawing::default();
        let rendering = provider.render("moon").await;
        assert_eq!(rendering.as_str(), placeholder_svg("moon", 400, 400));
    }
}
