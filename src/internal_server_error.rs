//! The page shown when a request fails for reasons the user cannot fix.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::Markup;

use crate::html::error_view;

fn internal_server_error_view() -> Markup {
    error_view(
        "Internal Server Error",
        "500",
        "Sorry, something went wrong on our end.",
        "Try the request again in a moment. The details have been logged.",
    )
}

/// Build the response for an unrecoverable server-side failure.
pub fn internal_server_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(internal_server_error_view().into_string()),
    )
        .into_response()
}

pub async fn get_internal_server_error_page() -> Response {
    internal_server_error_response()
}
