//! HTML rendering for the ledger table
//!
//! Every control renders as an `hx-get` to `/ledger/table` carrying the
//! table state it would produce, so the server stays the only place where
//! state transitions happen.

use lunacy_core::{
    cell_value, CellKind, ColumnDef, CoreError, FilterKind, HeaderKind, TableState, TableView,
    TransactionType,
};
use lunacy_feed::Transaction;
use lunacy_utils::{escape_html, format_plain_number, js_string_attr};

/// Element the table fragment is swapped into
pub const TABLE_TARGET: &str = "#ledger-table";
pub const TABLE_ROUTE: &str = "/ledger/table";

/// Most violations listed in the error banner
const MAX_LISTED_VIOLATIONS: usize = 10;

fn table_url(state: &TableState) -> String {
    format!("{}?{}", TABLE_ROUTE, state.to_query())
}

fn hx_attrs(url: &str) -> String {
    format!(
        "hx-get='{}' hx-target='{}' hx-indicator='{}'",
        escape_html(url),
        TABLE_TARGET,
        TABLE_TARGET
    )
}

fn with_state(state: &TableState, change: impl FnOnce(&mut TableState)) -> String {
    let mut next = state.clone();
    change(&mut next);
    table_url(&next)
}

// ==================== Toolbar ====================

fn render_type_menu(state: &TableState) -> String {
    let label = match state.type_filter {
        Some(kind) => format!("Type: {}", kind),
        None => "Type".to_string(),
    };

    let mut items = String::new();
    for kind in TransactionType::ALL {
        let active = state.type_filter == Some(kind);
        let url = with_state(state, |s| s.set_type_filter(Some(kind)));
        items.push_str(&format!(
            "<button type='button' {} class='block w-full px-3 py-1.5 text-left text-sm hover:bg-gray-100 dark:hover:bg-gray-800 {}'>{}</button>",
            hx_attrs(&url),
            if active { "font-semibold" } else { "" },
            kind
        ));
    }
    if state.type_filter.is_some() {
        let url = with_state(state, |s| s.clear_type_filter());
        items.push_str(&format!(
            "<div class='my-1 border-t dark:border-gray-700'></div><button type='button' {} class='block w-full px-3 py-1.5 text-left text-sm hover:bg-gray-100 dark:hover:bg-gray-800'>Clear Filter</button>",
            hx_attrs(&url)
        ));
    }

    format!(
        r#"<details class='relative'>
            <summary class='cursor-pointer list-none rounded-md border border-dashed px-3 py-2 text-sm dark:border-gray-700'>{}</summary>
            <div class='absolute z-10 mt-1 w-48 rounded-md border bg-white py-1 shadow-md dark:border-gray-700 dark:bg-gray-900'>{}</div>
        </details>"#,
        label, items
    )
}

fn render_view_menu(state: &TableState) -> String {
    let mut items = String::new();
    for column in lunacy_core::columns().iter().filter(|c| c.hideable) {
        let url = with_state(state, |s| s.toggle_visibility(column.id));
        items.push_str(&format!(
            "<label class='flex cursor-pointer items-center gap-2 px-3 py-1.5 text-sm capitalize hover:bg-gray-100 dark:hover:bg-gray-800'><input type='checkbox' {} hx-trigger='change' {}> {}</label>",
            if state.is_visible(column.id) { "checked" } else { "" },
            hx_attrs(&url),
            column.menu_label()
        ));
    }

    format!(
        r#"<details class='relative'>
            <summary class='cursor-pointer list-none rounded-md border px-3 py-2 text-sm dark:border-gray-700'>View</summary>
            <div class='absolute right-0 z-10 mt-1 w-44 rounded-md border bg-white py-1 shadow-md dark:border-gray-700 dark:bg-gray-900'>{}</div>
        </details>"#,
        items
    )
}

fn render_timestamp_filter(state: &TableState) -> String {
    // The input supplies `ts` itself; htmx appends it to this URL
    let mut base = state.clone();
    base.page_index = 0;
    let filter_url = format!("{}?{}", TABLE_ROUTE, base.to_query_except(&["ts", "page"]));

    format!(
        r#"<input id='timestamp-filter' type='text' name='ts' value='{}' placeholder='Filter timestamps...' autocomplete='off'
            {} hx-trigger='keyup changed delay:500ms'
            class='w-full max-w-sm rounded-md border px-3 py-2 text-sm dark:border-gray-700 dark:bg-gray-900'>"#,
        escape_html(&state.timestamp_filter),
        hx_attrs(&filter_url)
    )
}

/// Bulk action over the selected rows; enabled once anything is selected
fn render_bulk_action(selected_count: usize) -> String {
    format!(
        "<button type='button' {} class='rounded-md bg-orange-500 px-3 py-2 text-sm font-medium text-white disabled:cursor-not-allowed disabled:opacity-50'>Do something</button>",
        if selected_count == 0 { "disabled" } else { "" }
    )
}

/// Filter controls for every filterable column, then the bulk action and column menu
pub fn render_toolbar(state: &TableState, selected_count: usize) -> String {
    let filters: String = lunacy_core::columns()
        .iter()
        .map(|column| match column.filter {
            FilterKind::Text => render_timestamp_filter(state),
            FilterKind::Category => render_type_menu(state),
            FilterKind::None => String::new(),
        })
        .collect();

    format!(
        r#"<div class='flex items-center gap-2 py-4'>
            {}
            <div class='ml-auto flex items-center gap-2'>{}{}</div>
        </div>"#,
        filters,
        render_bulk_action(selected_count),
        render_view_menu(state)
    )
}

// ==================== Table ====================

fn header_cell(column: &ColumnDef, view: &TableView<'_>) -> String {
    let state = &view.state;
    let align = if column.is_numeric() { "text-right" } else { "text-left" };

    let content = match column.header {
        HeaderKind::SelectAll => {
            let page_ids = view.page_ids();
            let url = with_state(state, |s| s.toggle_all_page_rows(&page_ids));
            format!(
                "<input type='checkbox' aria-label='Select all' {} {} hx-trigger='change' {}>",
                if view.all_page_rows_selected { "checked" } else { "" },
                if view.some_page_rows_selected { "data-indeterminate='true'" } else { "" },
                hx_attrs(&url)
            )
        }
        HeaderKind::SortToggle(label) => {
            let url = with_state(state, |s| s.toggle_sort(column.id));
            let arrow = if state.sort.column != column.id {
                "↕"
            } else if state.sort.desc {
                "↓"
            } else {
                "↑"
            };
            format!(
                "<button type='button' {} class='inline-flex items-center gap-1 font-medium hover:text-gray-900 dark:hover:text-white'>{}<span aria-hidden='true'>{}</span></button>",
                hx_attrs(&url),
                label,
                arrow
            )
        }
        HeaderKind::Label(label) => label.to_string(),
        HeaderKind::Empty => String::new(),
    };

    format!(
        "<th class='h-10 px-2 {} align-middle font-medium text-gray-500 dark:text-gray-400'>{}</th>",
        align, content
    )
}

fn actions_menu(tx: &Transaction) -> String {
    format!(
        r#"<details class='relative'>
            <summary class='cursor-pointer list-none rounded px-2 text-gray-500' aria-label='Open menu'>⋯</summary>
            <div class='absolute right-0 z-10 mt-1 w-52 rounded-md border bg-white py-1 text-left shadow-md dark:border-gray-700 dark:bg-gray-900'>
                <div class='px-3 py-1.5 text-xs font-semibold text-gray-500'>Actions</div>
                <button type='button' onclick='navigator.clipboard.writeText({}).catch(function() {{}}); this.closest("details").open = false;'
                    class='block w-full px-3 py-1.5 text-left text-sm hover:bg-gray-100 dark:hover:bg-gray-800'>Copy transaction ID</button>
            </div>
        </details>"#,
        js_string_attr(&tx.tx_id)
    )
}

fn body_cell(column: &ColumnDef, tx: &Transaction, state: &TableState) -> String {
    match column.cell {
        CellKind::SelectRow => {
            let url = with_state(state, |s| s.toggle_row(&tx.tx_id));
            format!(
                "<td class='p-2'><input type='checkbox' aria-label='Select row' {} hx-trigger='change' {}></td>",
                if state.is_selected(&tx.tx_id) { "checked" } else { "" },
                hx_attrs(&url)
            )
        }
        CellKind::Text | CellKind::OptionalText => format!(
            "<td class='p-2'>{}</td>",
            escape_html(&cell_value(column.id, tx))
        ),
        CellKind::Currency => format!(
            "<td class='p-2 text-right font-medium tabular-nums'>{}</td>",
            cell_value(column.id, tx)
        ),
        CellKind::Actions => format!("<td class='p-2 text-right'>{}</td>", actions_menu(tx)),
    }
}

/// Placeholder rows shown while a table request is in flight
pub fn render_skeleton_rows(column_count: usize, row_count: usize) -> String {
    let cell = "<td class='p-2'><div class='h-4 w-full animate-pulse rounded bg-gray-200 dark:bg-gray-700'></div></td>";
    let row = format!("<tr class='border-b dark:border-gray-800'>{}</tr>", cell.repeat(column_count));
    row.repeat(row_count)
}

fn render_error_banner(error: &CoreError) -> String {
    let mut list = String::new();
    if let CoreError::InvalidFeed { violations } = error {
        list.push_str("<ul class='mt-2 list-disc pl-5'>");
        for violation in violations.iter().take(MAX_LISTED_VIOLATIONS) {
            list.push_str(&format!("<li class='font-mono text-xs'>{}</li>", escape_html(violation)));
        }
        if violations.len() > MAX_LISTED_VIOLATIONS {
            list.push_str(&format!(
                "<li class='text-xs'>and {} more</li>",
                violations.len() - MAX_LISTED_VIOLATIONS
            ));
        }
        list.push_str("</ul>");
    }

    format!(
        r#"<div role='alert' class='mb-4 rounded-md border border-red-300 bg-red-50 p-4 text-sm text-red-700 dark:border-red-800 dark:bg-red-950 dark:text-red-300'>
            <p class='font-medium'>Could not load transactions</p>
            <p>{}</p>{}
        </div>"#,
        escape_html(&error.to_string()),
        list
    )
}

fn render_pagination(view: &TableView<'_>, page_size_options: &[usize]) -> String {
    let state = &view.state;

    let size_url = format!(
        "{}?{}&top={}",
        TABLE_ROUTE,
        state.to_query_except(&["page", "size"]),
        state.page_index * state.page_size
    );
    let options: String = page_size_options
        .iter()
        .map(|size| {
            format!(
                "<option value='{}' {}>{}</option>",
                size,
                if *size == state.page_size { "selected" } else { "" },
                size
            )
        })
        .collect();

    let page_count = view.page_count;
    let button = |label: &str, title: &str, enabled: bool, url: String| {
        format!(
            "<button type='button' title='{}' {} {} class='h-8 w-8 rounded-md border text-sm disabled:cursor-not-allowed disabled:opacity-50 dark:border-gray-700'>{}</button>",
            title,
            if enabled { "" } else { "disabled" },
            hx_attrs(&url),
            label
        )
    };

    let buttons = [
        button("«", "Go to first page", view.can_previous(), with_state(state, |s| s.first_page())),
        button("‹", "Go to previous page", view.can_previous(), with_state(state, |s| s.previous_page())),
        button("›", "Go to next page", view.can_next(), with_state(state, |s| s.next_page(page_count))),
        button("»", "Go to last page", view.can_next(), with_state(state, |s| s.last_page(page_count))),
    ]
    .join("");

    format!(
        r#"<div class='flex items-center justify-between px-2 py-4'>
            <div class='flex-1 text-sm text-gray-500 dark:text-gray-400'>{}</div>
            <div class='flex items-center gap-6'>
                <div class='flex items-center gap-2'>
                    <p class='text-sm font-medium'>Transactions per page</p>
                    <select name='size' hx-trigger='change' {} class='h-8 rounded-md border px-2 text-sm dark:border-gray-700 dark:bg-gray-900'>{}</select>
                </div>
                <div class='text-sm font-medium'>{}</div>
                <div class='flex items-center gap-2'>{}</div>
            </div>
        </div>"#,
        view.selection_label(),
        hx_attrs(&size_url),
        options,
        view.page_label(),
        buttons
    )
}

/// Toolbar, optional error banner, table and pagination bar
pub fn render_table(view: &TableView<'_>, page_size_options: &[usize], error: Option<&CoreError>) -> String {
    let columns = view.state.visible_columns();

    let header: String = columns.iter().map(|c| header_cell(c, view)).collect();

    let body = if view.rows.is_empty() {
        format!(
            "<tr><td colspan='{}' class='h-24 text-center text-gray-500'>No results.</td></tr>",
            columns.len()
        )
    } else {
        view.rows
            .iter()
            .map(|tx| {
                let cells: String = columns.iter().map(|c| body_cell(c, tx, &view.state)).collect();
                format!(
                    "<tr class='border-b hover:bg-gray-50 dark:border-gray-800 dark:hover:bg-gray-900' {}>{}</tr>",
                    if view.state.is_selected(&tx.tx_id) { "data-state='selected'" } else { "" },
                    cells
                )
            })
            .collect()
    };

    let skeleton_rows = view.rows.len().clamp(1, view.state.page_size);

    let mut html = render_toolbar(&view.state, view.selected_count);
    if let Some(error) = error {
        html.push_str(&render_error_banner(error));
    }
    html.push_str(&format!(
        r#"<div class='rounded-md border dark:border-gray-800'>
            <table class='w-full caption-bottom text-sm'>
                <thead><tr class='border-b dark:border-gray-800'>{}</tr></thead>
                <tbody class='ledger-rows'>{}</tbody>
                <tbody class='ledger-skeleton'>{}</tbody>
            </table>
        </div>"#,
        header,
        body,
        render_skeleton_rows(columns.len(), skeleton_rows)
    ));
    html.push_str(&render_pagination(view, page_size_options));
    html.push_str(
        "<script>document.querySelectorAll('#ledger-table [data-indeterminate]').forEach(function (el) { el.indeterminate = true; });</script>",
    );
    html
}

/// Table placeholder for the first paint, before any data has arrived
pub fn render_skeleton_table(state: &TableState) -> String {
    let columns = state.visible_columns();
    let header: String = columns
        .iter()
        .map(|c| {
            let label = match c.header {
                HeaderKind::SortToggle(label) | HeaderKind::Label(label) => label,
                HeaderKind::SelectAll | HeaderKind::Empty => "",
            };
            format!("<th class='h-10 px-2 text-left font-medium text-gray-500'>{}</th>", label)
        })
        .collect();

    format!(
        r#"<div class='py-4'><div class='h-9 w-full max-w-sm animate-pulse rounded-md bg-gray-200 dark:bg-gray-700'></div></div>
        <div class='rounded-md border dark:border-gray-800'>
            <table class='w-full text-sm'>
                <thead><tr class='border-b dark:border-gray-800'>{}</tr></thead>
                <tbody>{}</tbody>
            </table>
        </div>"#,
        header,
        render_skeleton_rows(columns.len(), state.page_size)
    )
}

/// Spinner shown in the balance slot until the reveal fires
pub fn render_balance_spinner() -> String {
    "<div role='status' aria-label='Loading balance' class='h-8 w-8 animate-spin rounded-full border-4 border-gray-200 border-t-gray-700 dark:border-gray-700 dark:border-t-gray-200'></div>".to_string()
}

pub fn render_balance(total: f64) -> String {
    format!(
        "<span class='text-3xl font-bold tracking-tight tabular-nums'>${}</span>",
        format_plain_number(total)
    )
}

pub fn render_balance_error() -> String {
    "<span role='alert' class='text-sm text-red-600 dark:text-red-400'>Balance unavailable</span>".to_string()
}
