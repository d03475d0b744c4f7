use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

mod command;
mod template;

pub use command::CommandCaptioner;
pub use template::{template_caption, TemplateCaptioner};

pub fn caption_prompt(title: &str) -> String {
    format!("Write a short Instagram caption with hashtags for this world news:\n{title}")
}

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error while waiting for caption command: {0}")]
    Io(#[from] std::io::Error),
    #[error("caption command timed out after {0:?}")]
    Timeout(Duration),
    #[error("caption command exited with {0}")]
    ExitStatus(std::process::ExitStatus),
    #[error("caption command produced no output")]
    Empty,
}

/// Something that can turn a headline into a caption.
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    async fn generate(&self, title: &str) -> Result<String, CaptionError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionSource {
    Generated,
    Template,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
    pub source: CaptionSource,
}

/// One attempt at `primary`, then the template. Never fails and never
/// returns empty text.
pub async fn caption_with_fallback(primary: &dyn CaptionGenerator, title: &str) -> Caption {
    match primary.generate(title).await {
        Ok(text) if !text.trim().is_empty() => Caption {
            text: text.trim().to_string(),
            source: CaptionSource::Generated,
        },
        Ok(_) => fallback(title, &CaptionError::Empty),
        Err(e) => fallback(title, &e),
    }
}

fn fallback(title: &str, err: &CaptionError) -> Caption {
    tracing::warn!(error = %err, "⚠️ caption backend failed, using template");
    Caption { text: template_caption(title), source: CaptionSource::Template }
}


#[cfg(test)]
mod tests {
    use super::mock::MockCaptioner;
    use super::*;

    const HASHTAGS: &str = "#WorldNews #BreakingNews #Global #International #Update";

    #[tokio::test]
    async fn generated_text_is_trimmed_and_tagged() {
        let mock = MockCaptioner::new();
        mock.push_response(Ok("  Big news! #World \n".into()));
        let caption = caption_with_fallback(&mock, "Big news").await;
        assert_eq!(caption.text, "Big news! #World");
        assert_eq!(caption.source, CaptionSource::Generated);
        assert_eq!(mock.calls(), vec!["Big news".to_string()]);
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_template() {
        let mock = MockCaptioner::new();
        mock.push_response(Err(CaptionError::Timeout(Duration::from_secs(20))));
        let caption = caption_with_fallback(&mock, "Summit ends without deal").await;
        assert_eq!(caption.source, CaptionSource::Template);
        assert!(caption.text.contains("Summit ends without deal"));
        assert!(caption.text.contains(HASHTAGS));
    }

    #[tokio::test]
    async fn whitespace_only_output_counts_as_failure() {
        let mock = MockCaptioner::new();
        mock.push_response(Ok(" \n\t".into()));
        let caption = caption_with_fallback(&mock, "").await;
        assert_eq!(caption.source, CaptionSource::Template);
        assert!(!caption.text.is_empty());
    }

    #[test]
    fn prompt_embeds_title() {
        assert!(caption_prompt("Floods in Kerala").ends_with("\nFloods in Kerala"));
    }
}
