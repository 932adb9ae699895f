//! # Result Viewer
//!
//! Small axum app that renders a stored task and its solution as HTML.
//!
//! Two request shapes are served side by side:
//! - `GET /result/{user_id}` reads the shared [`ResultStore`];
//! - `GET /?task=..&solution=..` renders whatever the query carries.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::store::{ResultStore, SolutionRecord};

const RESULT_TEMPLATE: &str = include_str!("../templates/result.html");

pub const QUERY_DEFAULT_TASK: &str = "Немає завдань";
pub const QUERY_DEFAULT_SOLUTION: &str = "Рішення поки немає.";

#[derive(Clone)]
pub struct WebState {
    pub store: Arc<ResultStore>,
}

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    task: Option<String>,
    solution: Option<String>,
}

pub fn build_router(store: Arc<ResultStore>) -> Router {
    Router::new()
        .route("/", get(query_result))
        .route("/result/{user_id}", get(stored_result))
        .route("/health", get(health))
        .with_state(WebState { store })
}

async fn stored_result(State(state): State<WebState>, Path(user_id): Path<u64>) -> Html<String> {
    let record = state.store.get(user_id).await;
    debug!(user_id, "Rendering stored result");
    Html(render_record(&record))
}

async fn query_result(Query(query): Query<ResultQuery>) -> Html<String> {
    let task = query.task.as_deref().unwrap_or(QUERY_DEFAULT_TASK);
    let solution = query.solution.as_deref().unwrap_or(QUERY_DEFAULT_SOLUTION);
    Html(render_page(task, solution, ""))
}

async fn health() -> &'static str {
    "ok"
}

fn render_record(record: &SolutionRecord) -> String {
    let footer = if record.created_at.timestamp() == 0 {
        String::new()
    } else {
        format!("Оновлено {}", record.created_at.format("%Y-%m-%d %H:%M UTC"))
    };
    render_page(&record.task, &record.solution, &footer)
}

/// Fill the result template; all inserted text is escaped
pub fn render_page(task: &str, solution: &str, footer: &str) -> String {
    let mut page = String::with_capacity(RESULT_TEMPLATE.len() + task.len() + solution.len());
    let mut rest = RESULT_TEMPLATE;

    // Markers appear in this order in the template. Inserted text is never
    // scanned again, so user text containing a marker stays literal.
    for (marker, value) in [("{{task}}", task), ("{{solution}}", solution), ("{{footer}}", footer)] {
        if let Some((head, tail)) = rest.split_once(marker) {
            page.push_str(head);
            page.push_str(&html_escape(value));
            rest = tail;
        }
    }
    page.push_str(rest);
    page
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
