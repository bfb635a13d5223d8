//! Gallery handlers: the paginated page, thumbnails, originals, and refresh.
//!
//! Query parameters are parsed leniently. A missing or non-numeric `page` or
//! `id` counts as 0, and every number is then clamped into range by the index
//! or the paginator, so these handlers never reject a request for its
//! parameters.

use axum::extract::{RawQuery, State};
use axum::http::{Uri, header};
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, Markup, html};
use std::sync::Arc;
use tokio::task;
use tracing::info;

use super::AppState;
use super::error::ServerError;
use crate::imaging::{self, content_type};
use crate::paginate::{PageView, paginate};

/// Parse a query number the forgiving way: anything unparseable is 0.
pub fn parse_number(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// The first value of `key` in a raw query string, as a number.
///
/// Repeated keys are not an error; later occurrences are ignored.
pub fn query_number(query: Option<&str>, key: &str) -> i64 {
    let first = query.and_then(|q| {
        form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    });
    parse_number(first.as_deref())
}

/// `GET {prefix}/?page=N`, and any other unrouted path under the prefix.
pub fn gallery_page(state: &AppState, uri: &Uri) -> Markup {
    let snapshot = state.index.current_snapshot();
    let view = paginate(
        snapshot.entries(),
        query_number(uri.query(), "page"),
        state.gallery.page_size,
        state.gallery.page_window,
    );
    render_page(&view, snapshot.len(), &state.gallery.prefix, state.manual.is_some())
}

/// `GET {prefix}/thumb/?id=N`
pub async fn thumbnail(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ServerError> {
    let id = query_number(query.as_deref(), "id");
    let snapshot = state.index.current_snapshot();
    let backend = Arc::clone(&state.backend);
    let config = state.thumbnails;

    let thumb = task::spawn_blocking(move || {
        imaging::render_thumbnail(backend.as_ref(), &snapshot, id, &config)
    })
    .await??;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], thumb.jpeg).into_response())
}

/// `GET {prefix}/image/?id=N`
pub async fn original(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ServerError> {
    let id = query_number(query.as_deref(), "id");
    let snapshot = state.index.current_snapshot();

    let original = task::spawn_blocking(move || imaging::read_original(&snapshot, id)).await??;

    let mime = content_type(&original.entry.path);
    Ok(([(header::CONTENT_TYPE, mime)], original.bytes).into_response())
}

/// `GET {prefix}/refresh/`, only routed for the manual strategy.
pub async fn refresh(State(state): State<AppState>) -> Result<Response, ServerError> {
    let Some(manual) = state.manual.clone() else {
        return Ok(gallery_redirect(&state.gallery.prefix));
    };
    let snapshot = task::spawn_blocking(move || manual.refresh()).await?;
    info!(images = snapshot.len(), "Manual refresh");
    Ok(format!("Refreshed: {} images\n", snapshot.len()).into_response())
}

pub fn gallery_redirect(prefix: &str) -> Response {
    axum::response::Redirect::permanent(&format!("{prefix}/")).into_response()
}

// ============================================================================
// Rendering
// ============================================================================

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1rem; background: #111; color: #ddd; }
a { color: #9cf; text-decoration: none; }
.grid { display: flex; flex-wrap: wrap; gap: 6px; }
.grid img { display: block; }
.pager { margin: 1rem 0; display: flex; gap: .5rem; align-items: center; }
.pager .current { font-weight: bold; color: #fff; }
.muted { color: #777; }
";

fn page_href(prefix: &str, page: usize) -> String {
    format!("{prefix}/?page={page}")
}

fn render_pager(view: &PageView<'_>, prefix: &str) -> Markup {
    let first_in_range = view.pages_in_range.first().copied().unwrap_or(1);
    let last_in_range = view.pages_in_range.last().copied().unwrap_or(1);

    html! {
        nav.pager {
            a href=(page_href(prefix, view.prev_page)) { "« Prev" }
            @if view.show_first_page {
                a href=(page_href(prefix, view.first_page)) { (view.first_page) }
                @if first_in_range > view.first_page + 1 {
                    span.muted { "…" }
                }
            }
            @for &p in &view.pages_in_range {
                @if p == view.page {
                    span.current { (p) }
                } @else {
                    a href=(page_href(prefix, p)) { (p) }
                }
            }
            @if view.show_last_page {
                @if last_in_range + 1 < view.last_page {
                    span.muted { "…" }
                }
                a href=(page_href(prefix, view.last_page)) { (view.last_page) }
            }
            a href=(page_href(prefix, view.next_page)) { "Next »" }
        }
    }
}

/// The full gallery document for one page.
pub fn render_page(view: &PageView<'_>, total: usize, prefix: &str, can_refresh: bool) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Gallery · page " (view.page) }
                style { (STYLE) }
            }
            body {
                header {
                    span { (total) " images" }
                    @if view.page_count > 0 {
                        span.muted { " · page " (view.page) " of " (view.page_count) }
                    }
                    @if can_refresh {
                        " · "
                        a href={ (prefix) "/refresh/" } { "Refresh" }
                    }
                }
                @if view.entries.is_empty() {
                    p.muted { "No images found." }
                } @else {
                    (render_pager(view, prefix))
                    div.grid {
                        @for entry in view.entries {
                            a href={ (prefix) "/image/?id=" (entry.id) } target="_blank" title=(entry.name) {
                                img src={ (prefix) "/thumb/?id=" (entry.id) } alt=(entry.name) loading="lazy";
                            }
                        }
                    }
                    (render_pager(view, prefix))
                }
            }
        }
    }
}
