use std::sync::Arc;

use axum::{extract::State, response::Html};
use chainsight_ai::{ANALYSIS_ERROR_PREFIX, FETCH_ERROR_MESSAGE};

use crate::main_lib::AppState;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const SYMBOL_OPTIONS_SLOT: &str = "{{symbol_options}}";

/// Landing page with the symbol selector.
///
/// The symbol file is re-read on every request, so edits show up without
/// a restart.
#[utoipa::path(get, path = "/", responses((status = 200, description = "Landing page")))]
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let symbols = state.symbol_registry.load();
    Html(render_index(&symbols))
}

pub(crate) fn render_index(symbols: &[String]) -> String {
    let options: String = symbols
        .iter()
        .map(|symbol| {
            let escaped = escape_html(symbol);
            format!("<option value=\"{escaped}\">{escaped}</option>\n")
        })
        .collect();
    INDEX_TEMPLATE
        .replace(SYMBOL_OPTIONS_SLOT, &options)
        .replace("{{fetch_error_message}}", FETCH_ERROR_MESSAGE)
        .replace("{{analysis_error_prefix}}", ANALYSIS_ERROR_PREFIX)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
