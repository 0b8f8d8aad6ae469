//! Builds the sandboxed embed for a worksheet.
//!
//! The only ingress into the sandbox is injected here, before load: a JSON
//! bootstrap block carrying the saved state and view mode, plus the same two
//! values as window globals for the page's own script. Relative asset
//! references are resolved through the worksheet's asset map.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Scripts and forms only. No same-origin access, no top navigation, no popups.
pub const SANDBOX_POLICY: &str = "allow-scripts allow-forms";

/// Element id of the injected `application/json` bootstrap block.
pub const BOOTSTRAP_ID: &str = "worksheet-hub-bootstrap";

static ASSET_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\s(?:src|href))="([^"]+)""#).expect("valid regex"));
static NOT_RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.\-]*:|//|#)").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Student editing.
    #[default]
    Interactive,
    /// Marking and replay.
    ReadOnly,
    /// Handed in: same renderer, visually locked.
    Submitted,
}

impl ViewMode {
    pub fn is_interactive(self) -> bool {
        self == ViewMode::Interactive
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Interactive => "interactive",
            ViewMode::ReadOnly => "read_only",
            ViewMode::Submitted => "submitted",
        }
    }
}

/// Contents of the injected bootstrap block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
    #[serde(default)]
    pub saved_state: Option<Value>,
    #[serde(default)]
    pub view_mode: ViewMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Embed {
    pub srcdoc: String,
    pub sandbox: &'static str,
    pub view_mode: ViewMode,
}

pub struct EmbedBuilder<'a> {
    markup: &'a str,
    assets: Option<&'a BTreeMap<String, String>>,
    saved_state: Option<&'a Value>,
    mode: ViewMode,
}

impl<'a> EmbedBuilder<'a> {
    pub fn new(markup: &'a str) -> Self {
        Self {
            markup,
            assets: None,
            saved_state: None,
            mode: ViewMode::Interactive,
        }
    }

    pub fn assets(mut self, assets: &'a BTreeMap<String, String>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn saved_state(mut self, state: Option<&'a Value>) -> Self {
        self.saved_state = state;
        self
    }

    pub fn view_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> Embed {
        let markup = match self.assets {
            Some(assets) if !assets.is_empty() => rewrite_assets(self.markup, assets),
            _ => self.markup.to_string(),
        };

        let state = self.saved_state.cloned().unwrap_or(Value::Null);
        let bootstrap = json!({
            "savedState": state,
            "viewMode": self.mode,
        });
        let injected = format!(
            "<script type=\"application/json\" id=\"{BOOTSTRAP_ID}\">{}</script>\
             <script>window.WORKSHEET_SAVED_STATE = {}; window.WORKSHEET_VIEW_MODE = \"{}\";</script>",
            script_safe(&bootstrap),
            script_safe(&state),
            self.mode.as_str(),
        );

        Embed {
            srcdoc: inject_head(&markup, &injected),
            sandbox: SANDBOX_POLICY,
            view_mode: self.mode,
        }
    }
}

/// JSON that can sit inside a `<script>` element without closing it.
fn script_safe(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Points relative `src`/`href` values that appear in `assets` at their hosted URL.
pub fn rewrite_assets(markup: &str, assets: &BTreeMap<String, String>) -> String {
    ASSET_ATTR
        .replace_all(markup, |caps: &Captures| {
            let attr = &caps[1];
            let path = &caps[2];
            if NOT_RELATIVE.is_match(path) {
                return caps[0].to_string();
            }
            match assets.get(path.trim_start_matches("./")) {
                Some(url) => format!("{attr}=\"{}\"", escape_attr(url)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn inject_head(markup: &str, injected: &str) -> String {
    match markup.to_ascii_lowercase().find("</head>") {
        Some(at) => {
            let mut out = String::with_capacity(markup.len() + injected.len());
            out.push_str(&markup[..at]);
            out.push_str(injected);
            out.push_str(&markup[at..]);
            out
        }
        None => format!("{injected}{markup}"),
    }
}
