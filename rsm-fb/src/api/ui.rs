//! Embedded dashboard front end
//!
//! `index.html` holds the filter bar, the review table, the correction form
//! and the evaluation panel; `app.js` drives them through the JSON API. Both
//! are compiled into the binary, so the dashboard needs no asset directory.
//! They are served with `no-cache` so a restarted dashboard never shows a
//! stale script against a newer API.

use axum::{
    http::header,
    response::{Html, IntoResponse},
};

const INDEX_HTML: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");

const NO_CACHE: (header::HeaderName, &str) = (header::CACHE_CONTROL, "no-cache");

/// GET /
pub async fn serve_index() -> impl IntoResponse {
    ([NO_CACHE], Html(INDEX_HTML))
}

/// GET /static/app.js
pub async fn serve_app_js() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
            NO_CACHE,
        ],
        APP_JS,
    )
}
