//! Defines the page for uploading a CSV file of transactions.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
};

fn import_form_view() -> Markup {
    let import_route = endpoints::IMPORT;
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(import_route)
            enctype="multipart/form-data"
            hx-disabled-elt="#files, #submit-button"
            hx-indicator="#indicator"
            hx-swap="none"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="files"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Choose file(s) to upload"
                }

                input
                    id="files"
                    type="file"
                    name="files"
                    accept="text/csv"
                    placeholder="files"
                    multiple
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p
                {
                    "Upload CSV files with the columns Name, Amount, Type, Category, and Date \
                    to import your transactions. Files exported from the transactions page \
                    can be imported as-is."
                }
            }

            button
                type="submit"
                id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Upload Files"
            }
        }
    }
}

fn import_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md mx-auto space-y-4"
            {
                h1 class="text-xl font-bold" { "Import Transactions" }

                (import_form_view())
            }
        }
    };

    base("Import Transactions", &[], &content)
}

/// Renders the page for importing transactions from CSV files.
pub async fn get_import_page() -> Response {
    import_view().into_response()
}

#[cfg(test)]
mod import_page_tests {
    use axum::{body::Body, http::StatusCode, response::Response};
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::get_import_page;

    #[tokio::test]
    async fn import_page_has_upload_form() {
        let response = get_import_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html(response).await;
        assert!(
            document.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            document.errors
        );

        let form_selector = Selector::parse("form").unwrap();
        let forms: Vec<_> = document.select(&form_selector).collect();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());

        let form = forms[0].value();
        assert_eq!(form.attr("hx-post"), Some(endpoints::IMPORT));
        assert_eq!(form.attr("enctype"), Some("multipart/form-data"));

        let input_selector = Selector::parse("input[type=file]").unwrap();
        let inputs: Vec<_> = document.select(&input_selector).collect();
        assert_eq!(inputs.len(), 1, "want 1 file input, got {}", inputs.len());
        assert_eq!(inputs[0].value().attr("accept"), Some("text/csv"));
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }
}
