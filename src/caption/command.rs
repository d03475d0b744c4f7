use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{caption_prompt, CaptionError, CaptionGenerator};

/// Runs a local text-generation CLI as `<command> run <model> <prompt>` and
/// takes its stdout as the caption.
#[derive(Clone, Debug)]
pub struct CommandCaptioner {
    command: String,
    model: String,
    timeout: Duration,
}

impl CommandCaptioner {
    pub fn new(command: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self { command: command.into(), model: model.into(), timeout }
    }
}

#[async_trait]
impl CaptionGenerator for CommandCaptioner {
    async fn generate(&self, title: &str) -> Result<String, CaptionError> {
        let child = Command::new(&self.command)
            .arg("run")
            .arg(&self.model)
            .arg(caption_prompt(title))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            // dropping the wait future on timeout must not leave the model running
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CaptionError::Spawn { command: self.command.clone(), source })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CaptionError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(CaptionError::ExitStatus(output.status));
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(CaptionError::Empty);
        }
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn captioner(command: &str) -> CommandCaptioner {
        CommandCaptioner::new(command, "phi3", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn stdout_becomes_the_caption() {
        let text = captioner("echo").generate("Headline").await.unwrap();
        assert!(text.starts_with("run phi3 Write a short Instagram caption"));
        assert!(text.ends_with("Headline"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = captioner("newsposter-no-such-binary").generate("x").await.unwrap_err();
        assert!(matches!(err, CaptionError::Spawn { .. }));
    }

    #[tokio::test]
    async fn hung_command_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-model");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let slow = CommandCaptioner::new(script.to_string_lossy(), "phi3", Duration::from_millis(100));
        let started = std::time::Instant::now();
        let err = slow.generate("x").await.unwrap_err();
        assert!(matches!(err, CaptionError::Timeout(d) if d == Duration::from_millis(100)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let err = captioner("false").generate("x").await.unwrap_err();
        assert!(matches!(err, CaptionError::ExitStatus(_)));
    }
}
