//! HTML rendering for the transactions page.

use maud::{Markup, html};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, EXPENSE_BADGE_STYLE, FORM_TEXT_INPUT_STYLE, INCOME_BADGE_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    transaction::{
        Transaction, TransactionKind,
        filter::{KindFilter, SortColumn, SortOrder, TableQuery},
    },
};

/// The max number of graphemes to display in the transaction name column
/// before truncating and displaying ellipses.
const MAX_NAME_GRAPHEMES: usize = 32;

fn amount_class(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "text-green-700 dark:text-green-300",
        TransactionKind::Expense => "text-red-700 dark:text-red-300",
    }
}

/// The URL for re-sorting the table by `column`.
///
/// Clicking the active sort column toggles the direction, clicking any other
/// column sorts by it in the default direction.
fn sort_url(query: &TableQuery, column: SortColumn) -> String {
    let order = if query.sort == column {
        query.order.reversed()
    } else {
        SortOrder::default()
    };

    let target = TableQuery {
        sort: column,
        order,
        ..query.clone()
    };

    table_url(&target)
}

fn table_url(query: &TableQuery) -> String {
    match serde_urlencoded::to_string(query) {
        Ok(params) => format!("{}?{}", endpoints::TRANSACTIONS_VIEW, params),
        Err(error) => {
            tracing::error!("Could not encode table query: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    }
}

/// The URL for downloading the current table view as a CSV file.
fn export_url(query: &TableQuery) -> String {
    match serde_urlencoded::to_string(query) {
        Ok(params) => format!("{}?{}", endpoints::EXPORT, params),
        Err(error) => {
            tracing::error!("Could not encode table query: {error}");
            endpoints::EXPORT.to_owned()
        }
    }
}

fn sort_indicator(query: &TableQuery, column: SortColumn) -> &'static str {
    if query.sort != column {
        return "";
    }

    match query.order {
        SortOrder::Ascending => " ▲",
        SortOrder::Descending => " ▼",
    }
}

fn sortable_header(query: &TableQuery, column: SortColumn, label: &str) -> Markup {
    html! {
        th scope="col" class=(TABLE_CELL_STYLE)
        {
            a href=(sort_url(query, column)) class="hover:underline"
            {
                (label) (sort_indicator(query, column))
            }
        }
    }
}

fn truncate_name(name: &str) -> String {
    let graphemes = name.graphemes(true).collect::<Vec<_>>();

    if graphemes.len() <= MAX_NAME_GRAPHEMES {
        name.to_owned()
    } else {
        format!("{}...", graphemes[..MAX_NAME_GRAPHEMES].concat())
    }
}

fn kind_badge(kind: TransactionKind) -> Markup {
    match kind {
        TransactionKind::Income => html! { span class=(INCOME_BADGE_STYLE) { "Income" } },
        TransactionKind::Expense => html! { span class=(EXPENSE_BADGE_STYLE) { "Expense" } },
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.name
    );
    let signed_amount = match transaction.kind {
        TransactionKind::Income => format!("+{}", format_currency(transaction.amount)),
        TransactionKind::Expense => format!("-{}", format_currency(transaction.amount)),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (truncate_name(&transaction.name)) }
            td class={ "px-6 py-4 text-right font-medium " (amount_class(transaction.kind)) }
            {
                (signed_amount)
            }
            td class=(TABLE_CELL_STYLE) { (kind_badge(transaction.kind)) }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_url)
                    hx-confirm=(confirm_message)
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                {
                    "Delete"
                }
            }
        }
    }
}

fn filter_controls(query: &TableQuery) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-wrap items-end gap-2"
        {
            input type="hidden" name="sort" value=(query.sort.as_str());
            input type="hidden" name="order" value=(query.order.as_str());

            input
                name="search"
                id="search"
                type="search"
                placeholder="Search by name"
                value=(query.search)
                class=(FORM_TEXT_INPUT_STYLE);

            select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="all" selected[query.kind == KindFilter::All] { "All" }
                option value="income" selected[query.kind == KindFilter::Income] { "Income" }
                option value="expense" selected[query.kind == KindFilter::Expense] { "Expense" }
            }

            button
                type="submit"
                class="px-4 py-2 rounded-lg text-sm font-medium text-white bg-blue-600
                    hover:bg-blue-700"
            {
                "Apply"
            }
        }
    }
}

pub(crate) fn transactions_view(transactions: &[Transaction], query: &TableQuery) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE) { "Import CSV" }

                    a href=(export_url(query)) class=(LINK_STYLE) download { "Export CSV" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "New Transaction"
                    }
                }

                (filter_controls(query))

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden
                    lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full my-2 text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                (sortable_header(query, SortColumn::Name, "Name"))
                                (sortable_header(query, SortColumn::Amount, "Amount"))
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                (sortable_header(query, SortColumn::Date, "Date"))
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center"
                                    {
                                        "No transactions match the current filters."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}
