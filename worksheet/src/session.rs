//! What the embedded page does when it loads: read the injected bootstrap,
//! build the document, replay the saved state and lock it unless the mode is
//! interactive.

use crate::document::WorksheetDocument;
use crate::embed::{BOOTSTRAP_ID, Bootstrap, ViewMode};
use crate::extractor::{self, LoadReport};
use crate::snapshot::Snapshot;
use crate::tasks::TaskRegistry;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static BOOTSTRAP: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(&format!("script[type=\"application/json\"]#{BOOTSTRAP_ID}"))
        .expect("valid selector")
});

#[derive(Debug)]
pub struct WorksheetSession {
    pub document: WorksheetDocument,
    pub mode: ViewMode,
    pub report: LoadReport,
}

/// Reads the bootstrap block from an embed `srcdoc`. A missing or unreadable
/// block means a fresh interactive session.
pub fn read_bootstrap(srcdoc: &str) -> Option<Bootstrap> {
    let html = Html::parse_document(srcdoc);
    let text: String = html.select(&BOOTSTRAP).next()?.text().collect();
    match serde_json::from_str(&text) {
        Ok(b) => Some(b),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable worksheet bootstrap");
            None
        }
    }
}

impl WorksheetSession {
    pub fn bootstrap(srcdoc: &str, registry: &TaskRegistry) -> Self {
        let bootstrap = read_bootstrap(srcdoc);
        let mode = bootstrap.as_ref().map(|b| b.view_mode).unwrap_or_default();

        let mut document = WorksheetDocument::parse(srcdoc, registry);

        let saved = bootstrap
            .and_then(|b| b.saved_state)
            .filter(|v| !v.is_null())
            .and_then(|v| match serde_json::from_value::<Snapshot>(v) {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::warn!(error = %e, "saved state is not a snapshot; starting empty");
                    None
                }
            });
        let report = match &saved {
            Some(s) => extractor::load(&mut document, s),
            None => LoadReport::default(),
        };

        if !mode.is_interactive() {
            document.freeze();
        }

        Self {
            document,
            mode,
            report,
        }
    }

    pub fn extract(&self) -> Snapshot {
        extractor::extract(&self.document)
    }
}
