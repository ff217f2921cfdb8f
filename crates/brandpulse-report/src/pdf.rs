//! PDF rendering through headless Chromium.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use brandpulse_core::PdfConfig;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::ReportError;

/// A4 in inches.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const CHART_READY_JS: &str = "typeof Chart !== 'undefined'";
const CANVAS_COUNT_JS: &str = "document.querySelectorAll('canvas').length";
const DRAWN_CANVAS_JS: &str = r"(() => {
  const canvases = Array.from(document.querySelectorAll('canvas'));
  let drawn = 0;
  for (const c of canvases) {
    try {
      const data = c.getContext('2d').getImageData(0, 0, c.width, c.height).data;
      for (let i = 3; i < data.length; i += 4) {
        if (data[i] !== 0) { drawn++; break; }
      }
    } catch (e) {}
  }
  return [canvases.length, drawn];
})()";

/// Turns a self-contained HTML page into PDF bytes.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ReportError>;
}

/// Launches a fresh headless Chromium per document.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    config: PdfConfig,
}

impl ChromiumRenderer {
    #[must_use]
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig, ReportError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .viewport(Viewport {
                width: self.config.viewport_width,
                height: self.config.viewport_height,
                ..Viewport::default()
            })
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(ReportError::Browser)
    }

    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), ReportError> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?).await?;
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "chromium handler stopped");
                    break;
                }
            }
        });
        Ok((browser, events))
    }

    async fn print(&self, browser: &Browser, html: &str) -> Result<Vec<u8>, ReportError> {
        let page = browser.new_page("about:blank").await?;

        bounded("page content", self.config.load_timeout_secs, async {
            page.set_content(html).await?;
            Ok(())
        })
        .await?;

        let ready = self.config.ready_timeout_secs;
        bounded("chart library", ready, poll_until(&page, CHART_READY_JS)).await?;
        if html.contains("<canvas") {
            let script = format!("{CANVAS_COUNT_JS} > 0");
            bounded("chart canvases", ready, poll_until(&page, &script)).await?;
        }

        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
        log_canvas_check(&page).await;

        let pdf = page.pdf(print_params()).await?;
        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "failed to close report page");
        }
        Ok(pdf)
    }
}

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render(&self, html: &str) -> Result<Vec<u8>, ReportError> {
        let (mut browser, events) = self.launch().await?;
        let outcome = self.print(&browser, html).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "failed to close chromium");
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!(error = %e, "failed to reap chromium process");
        }
        events.abort();

        match &outcome {
            Ok(bytes) => tracing::info!(bytes = bytes.len(), "pdf rendered"),
            Err(e) => tracing::error!(error = %e, "pdf render failed"),
        }
        outcome
    }
}

fn print_params() -> PrintToPdfParams {
    PrintToPdfParams {
        print_background: Some(true),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        prefer_css_page_size: Some(false),
        ..PrintToPdfParams::default()
    }
}

async fn bounded<T, F>(stage: &'static str, secs: u64, fut: F) -> Result<T, ReportError>
where
    F: Future<Output = Result<T, ReportError>>,
{
    tokio::time::timeout(Duration::from_secs(secs), fut)
        .await
        .map_err(|_| ReportError::Timeout { stage, secs })?
}

/// Re-evaluates `script` until it yields `true`. Callers bound the wait.
async fn poll_until(page: &Page, script: &str) -> Result<(), ReportError> {
    loop {
        let ready = page
            .evaluate(script)
            .await?
            .into_value::<bool>()
            .unwrap_or(false);
        if ready {
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn log_canvas_check(page: &Page) {
    match page.evaluate(DRAWN_CANVAS_JS).await {
        Ok(result) => match result.into_value::<(u32, u32)>() {
            Ok((total, drawn)) if drawn < total => {
                tracing::warn!(total, drawn, "some chart canvases look blank");
            }
            Ok((total, drawn)) => tracing::debug!(total, drawn, "chart canvases drawn"),
            Err(e) => tracing::debug!(error = %e, "canvas check returned unexpected value"),
        },
        Err(e) => tracing::debug!(error = %e, "canvas check failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_a4_with_backgrounds() {
        let params = print_params();
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.paper_width, Some(A4_WIDTH_IN));
        assert_eq!(params.paper_height, Some(A4_HEIGHT_IN));
    }

    #[tokio::test]
    async fn bounded_reports_the_stage_that_timed_out() {
        let err = bounded("chart library", 0, async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, ReportError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReportError::Timeout { stage: "chart library", secs: 0 }
        ));
    }

    #[tokio::test]
    async fn bounded_passes_through_inner_errors() {
        let err = bounded("page content", 5, async {
            Err::<(), _>(ReportError::Browser("navigation failed".to_string()))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "browser error: navigation failed");
    }
}
