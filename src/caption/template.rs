use async_trait::async_trait;

use super::{CaptionError, CaptionGenerator};

pub fn template_caption(title: &str) -> String {
    format!(
        "🌍 World Update\n\n{title}\n\nStay informed with the latest global news.\n#WorldNews #BreakingNews #Global #International #Update"
    )
}

/// Deterministic captioner that never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateCaptioner;

#[async_trait]
impl CaptionGenerator for TemplateCaptioner {
    async fn generate(&self, title: &str) -> Result<String, CaptionError> {
        Ok(template_caption(title))
    }
}
