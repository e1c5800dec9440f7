//! Drives an opened tool from submit to its result actions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use market_application::LifecycleController;
use market_core::clipboard::Clipboard;
use market_core::error::{MarketError, Result};
use market_core::generation::GenerationOutput;
use market_core::invocation::InvocationPhase;
use market_infrastructure::OutputWriter;
use tracing::Instrument;

/// What to do with a successful result.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Copy a text result to the clipboard.
    pub copy: bool,
    /// Save a media result into the output directory.
    pub save: bool,
    /// How often the progress message is re-checked while waiting.
    pub progress_every: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            copy: false,
            save: true,
            progress_every: Duration::from_millis(500),
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub phase: InvocationPhase,
    pub output: Option<GenerationOutput>,
    pub error: Option<String>,
    pub saved_to: Option<PathBuf>,
    pub copied: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.phase == InvocationPhase::Succeeded
    }
}

/// Runs tools and applies the result actions.
pub struct ToolRunner {
    writer: OutputWriter,
    clipboard: Option<Arc<dyn Clipboard>>,
}

impl ToolRunner {
    pub fn new(writer: OutputWriter) -> Self {
        Self {
            writer,
            clipboard: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn output_dir(&self) -> &std::path::Path {
        self.writer.directory()
    }

    /// Submits the form and waits for the terminal phase.
    ///
    /// `on_progress` receives each new progress message of the tool while it
    /// is waiting.
    pub async fn run<F>(
        &self,
        controller: &LifecycleController,
        options: &RunOptions,
        mut on_progress: F,
    ) -> Result<RunReport>
    where
        F: FnMut(&str),
    {
        let span = tracing::info_span!("tool_invocation", tool = %controller.key());
        let submit = controller.submit().instrument(span);
        tokio::pin!(submit);

        let mut ticker = tokio::time::interval(options.progress_every);
        let mut last_message = None;
        let phase = loop {
            tokio::select! {
                phase = &mut submit => break phase?,
                _ = ticker.tick() => {
                    if let Some(message) = controller.progress_message() {
                        if last_message != Some(message) {
                            on_progress(message);
                            last_message = Some(message);
                        }
                    }
                }
            }
        };

        let mut report = RunReport {
            phase,
            output: None,
            error: None,
            saved_to: None,
            copied: false,
        };
        if phase != InvocationPhase::Succeeded {
            report.error = controller
                .snapshot()?
                .error_message()
                .map(str::to_string);
            return Ok(report);
        }

        if options.save {
            report.saved_to = self.save(controller).await?;
        }
        if options.copy {
            report.copied = self.copy(controller)?;
        }
        report.output = controller.snapshot()?.result().cloned();
        Ok(report)
    }

    /// Writes the media result under its fixed file name.
    pub async fn save(&self, controller: &LifecycleController) -> Result<Option<PathBuf>> {
        match controller.download()? {
            Some(download) => {
                let path = self
                    .writer
                    .write(download.filename, &download.asset.bytes)
                    .await?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// Copies the text result. `false` when there is nothing to copy.
    pub fn copy(&self, controller: &LifecycleController) -> Result<bool> {
        let clipboard = self
            .clipboard
            .as_deref()
            .ok_or_else(|| MarketError::config("No clipboard available"))?;
        controller.copy_text(clipboard)
    }
}

/// Opens an externally hosted tool in the system browser.
pub fn open_external(url: &str) -> Result<()> {
    tracing::info!(url, "Opening external tool");
    opener::open_browser(url)
        .map_err(|e| MarketError::io(format!("Failed to open {url}: {e}")))
}
