//! The summary cards shown at the top of the dashboard.

use maud::{Markup, html};

use crate::{dashboard::aggregation::Totals, html::format_currency};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col gap-1";

const CARD_LABEL_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";

const CARD_DETAIL_STYLE: &str = "text-xs text-gray-500 dark:text-gray-400";

/// Renders the balance, total income, and total expense cards.
pub(super) fn summary_cards_view(totals: &Totals) -> Markup {
    let balance_style = if totals.balance < 0.0 {
        "text-2xl font-bold text-red-700 dark:text-red-300"
    } else {
        "text-2xl font-bold text-gray-900 dark:text-white"
    };

    html! {
        section
            id="summary-cards"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
            {
                div class=(CARD_STYLE)
                {
                    span class=(CARD_LABEL_STYLE) { "Balance" }
                    span class=(balance_style) { (format_currency(totals.balance)) }
                }

                div class=(CARD_STYLE)
                {
                    span class=(CARD_LABEL_STYLE) { "Total Income" }
                    span class="text-2xl font-bold text-green-700 dark:text-green-300"
                    {
                        (format_currency(totals.total_income))
                    }
                    span class=(CARD_DETAIL_STYLE) { (transaction_count(totals.income_count)) }
                }

                div class=(CARD_STYLE)
                {
                    span class=(CARD_LABEL_STYLE) { "Total Expenses" }
                    span class="text-2xl font-bold text-red-700 dark:text-red-300"
                    {
                        (format_currency(totals.total_expense))
                    }
                    span class=(CARD_DETAIL_STYLE) { (transaction_count(totals.expense_count)) }
                }
            }
        }
    }
}

fn transaction_count(count: usize) -> String {
    if count == 1 {
        "1 transaction".to_owned()
    } else {
        format!("{count} transactions")
    }
}
