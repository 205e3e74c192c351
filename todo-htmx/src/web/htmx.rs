//! htmx request detection and the response shape that depends on it.
//!
//! htmx marks every request it issues with `HX-Request: true`. Mutating
//! handlers answer those with an HTML fragment to swap into the page, and
//! answer plain browser form submissions with a `303 See Other` back to `/`.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Serialize;
use std::convert::Infallible;

/// Name of the header htmx sends with every request it issues.
pub const HX_REQUEST: &str = "hx-request";

/// Whether the request was issued by htmx.
///
/// Only the exact value `true` counts; any other value, or no header at all,
/// is treated as a regular browser request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl HxRequest {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(
            headers
                .get(HX_REQUEST)
                .is_some_and(|value| value.as_bytes() == b"true"),
        )
    }
}

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Response of a mutating handler: either a fragment for htmx to swap in, or
/// a redirect that makes a plain browser reload the full page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOrRedirect {
    /// `303 See Other` to `/`.
    FullPageRedirect,
    /// `200 OK` with the given HTML. An empty fragment removes the swap target.
    Fragment(String),
}

impl FragmentOrRedirect {
    /// Picks the response shape. `render` only runs for htmx requests.
    pub fn choose<E>(
        is_hx_request: bool,
        render: impl FnOnce() -> Result<String, E>,
    ) -> Result<Self, E> {
        if !is_hx_request {
            return Ok(Self::FullPageRedirect);
        }
        render().map(Self::Fragment)
    }

    /// Like [`choose`](Self::choose) with an empty fragment, which never fails.
    pub fn empty(is_hx_request: bool) -> Self {
        if is_hx_request {
            Self::Fragment(String::new())
        } else {
            Self::FullPageRedirect
        }
    }
}

impl IntoResponse for FragmentOrRedirect {
    fn into_response(self) -> Response {
        match self {
            Self::FullPageRedirect => Redirect::to("/").into_response(),
            Self::Fragment(html) => Html(html).into_response(),
        }
    }
}

/// Client configuration published through the `htmx-config` meta tag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmxConfig {
    pub allow_script_tags: bool,
    pub allow_eval: bool,
    pub self_requests_only: bool,
    pub history_cache_size: u32,
    /// History restores must fetch the full page, since `HX-Request` selects fragments.
    pub history_restore_as_hx_request: bool,
}

impl Default for HtmxConfig {
    fn default() -> Self {
        Self {
            allow_script_tags: false,
            allow_eval: false,
            self_requests_only: true,
            history_cache_size: 0,
            history_restore_as_hx_request: false,
        }
    }
}

impl HtmxConfig {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
