//! Alert messages for displaying success and error notifications to users.
//!
//! Alerts are rendered as htmx out-of-band swaps targeting the
//! `#alert-container` element in the base layout, so any endpoint can push a
//! transient notification without replacing the page content.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// A transient notification shown to the user at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, text_style, message, details) = match self {
            Alert::Success { message, details } => (
                "p-4 mb-4 rounded-lg bg-green-50 dark:bg-gray-800",
                "text-green-800 dark:text-green-400",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "p-4 mb-4 rounded-lg bg-red-50 dark:bg-gray-800",
                "text-red-800 dark:text-red-400",
                message,
                details,
            ),
            Alert::ErrorSimple { message } => (
                "p-4 mb-4 rounded-lg bg-red-50 dark:bg-gray-800",
                "text-red-800 dark:text-red-400",
                message,
                String::new(),
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    class=(container_style)
                    role="alert"
                {
                    p class={ "font-medium " (text_style) } { (message) }

                    @if !details.is_empty() {
                        p class={ "text-sm " (text_style) } { (details) }
                    }
                }
            }
        }
    }

    pub fn into_response(self) -> Response {
        let status_code = match &self {
            Alert::Success { .. } => StatusCode::OK,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status_code, self.into_html()).into_response()
    }
}
