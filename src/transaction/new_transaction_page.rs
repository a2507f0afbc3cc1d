//! Defines the route handler for the page for recording a new transaction.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};
use time::OffsetDateTime;

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
};

fn new_transaction_view(default_date: time::Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full max-w-md mx-auto space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        name="name"
                        id="name"
                        type="text"
                        placeholder="e.g. Rent, Salary"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                    select
                        name="kind"
                        id="kind"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="income" { "Income" }
                        option value="expense" { "Expense" }
                    }
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    input
                        name="category"
                        id="category"
                        type="text"
                        placeholder="e.g. Groceries, Transport"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        required
                        value=(default_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Create Transaction"
                }
            }
        }
    };

    base("New Transaction", &[], &content)
}

/// Renders the page for recording a transaction.
pub async fn get_new_transaction_page() -> Response {
    new_transaction_view(OffsetDateTime::now_utc().date()).into_response()
}

#[cfg(test)]
mod view_tests {
    use axum::{body::Body, http::StatusCode, response::Response};
    use scraper::{ElementRef, Html};
    use time::OffsetDateTime;

    use crate::endpoints;

    use super::get_new_transaction_page;

    #[tokio::test]
    async fn new_transaction_returns_form() {
        let response = get_new_transaction_page().await;

        assert_status_ok(&response);
        let document = parse_html(response).await;
        assert_valid_html(&document);
        assert_correct_form(&document);
    }

    #[track_caller]
    fn assert_status_ok(response: &Response<Body>) {
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[track_caller]
    fn assert_correct_form(document: &Html) {
        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());

        let form = forms.first().unwrap();
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::TRANSACTIONS_API),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::TRANSACTIONS_API,
            hx_post
        );

        assert_correct_inputs(form);
        assert_kind_select(form);
        assert_has_submit_button(form);
    }

    #[track_caller]
    fn assert_correct_inputs(form: &ElementRef) {
        let expected_inputs = vec![
            ("name", "text"),
            ("amount", "number"),
            ("category", "text"),
            ("date", "date"),
        ];

        for (name, element_type) in expected_inputs {
            let selector_string = format!("input[name={name}]");
            let input_selector = scraper::Selector::parse(&selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(inputs.len(), 1, "want 1 {name} input, got {}", inputs.len());

            let input = inputs.first().unwrap();
            assert_eq!(input.value().attr("type"), Some(element_type));
            assert_required(input);

            if name == "date" {
                assert_eq!(
                    input.value().attr("value"),
                    Some(OffsetDateTime::now_utc().date().to_string().as_str()),
                );
                // Future dates are allowed so the input must not be capped.
                assert_eq!(input.value().attr("max"), None);
            }
        }
    }

    #[track_caller]
    fn assert_kind_select(form: &ElementRef) {
        let select_selector = scraper::Selector::parse("select[name=kind]").unwrap();
        let selects = form.select(&select_selector).collect::<Vec<_>>();
        assert_eq!(selects.len(), 1, "want 1 kind select");

        let option_selector = scraper::Selector::parse("option").unwrap();
        let values: Vec<_> = selects[0]
            .select(&option_selector)
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(values, vec!["income", "expense"]);
    }

    #[track_caller]
    fn assert_required(input: &ElementRef) {
        let required = input.value().attr("required");
        let input_name = input.value().attr("name").unwrap();
        assert!(
            required.is_some(),
            "want {input_name} input to be required, got {required:?}"
        );
    }

    #[track_caller]
    fn assert_has_submit_button(form: &ElementRef) {
        let button_selector = scraper::Selector::parse("button").unwrap();
        let buttons = form.select(&button_selector).collect::<Vec<_>>();
        assert_eq!(buttons.len(), 1, "want 1 button, got {}", buttons.len());
        let button_type = buttons.first().unwrap().value().attr("type");
        assert_eq!(
            button_type,
            Some("submit"),
            "want button with type=\"submit\", got {button_type:?}"
        );
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
