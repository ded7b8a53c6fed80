//! Table state and the filtered, sorted, paginated view built from it
//!
//! `TableState` is a plain value: every control on the page produces a new
//! state, which round-trips through the query string so each htmx request
//! carries the whole table configuration.

use crate::columns::{column_def, columns, raw_value, ColumnDef, ColumnId};
use crate::error::CoreError;
use lunacy_feed::Transaction;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Transaction categories offered by the type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Investment,
    Withdrawal,
    Transfer,
    Refund,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Deposit,
        TransactionType::Investment,
        TransactionType::Withdrawal,
        TransactionType::Transfer,
        TransactionType::Refund,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Investment => "INVESTMENT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Refund => "REFUND",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown transaction type: {}", s))
    }
}

// ==================== Ordering ====================

fn chunks(s: &str) -> Vec<(bool, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut digit = None;
    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match digit {
            Some(d) if d != is_digit => {
                out.push((d, &s[start..i]));
                start = i;
            }
            _ => {}
        }
        digit = Some(is_digit);
    }
    if let Some(d) = digit {
        out.push((d, &s[start..]));
    }
    out
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Case-insensitive natural ordering: digit runs compare by numeric value
/// (`A2 < A10`), everything else lexically.
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let la = a.to_lowercase();
    let lb = b.to_lowercase();
    let ca = chunks(&la);
    let cb = chunks(&lb);

    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x.0, y.0) {
            (true, true) => compare_digits(x.1, y.1),
            _ => x.1.cmp(y.1),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

fn compare_rows(column: ColumnId, a: &Transaction, b: &Transaction) -> Ordering {
    match column {
        ColumnId::Amount => a.amount.total_cmp(&b.amount),
        ColumnId::Balance => a.balance.total_cmp(&b.balance),
        _ => {
            let av = raw_value(column, a).unwrap_or_default();
            let bv = raw_value(column, b).unwrap_or_default();
            compare_alphanumeric(&av, &bv)
        }
    }
}

// ==================== State ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: ColumnId,
    pub desc: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self { column: ColumnId::TxId, desc: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub sort: SortState,
    pub timestamp_filter: String,
    pub type_filter: Option<TransactionType>,
    pub page_size: usize,
    pub page_index: usize,
    pub hidden: BTreeSet<ColumnId>,
    pub selected: BTreeSet<String>,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        Self {
            sort: SortState::default(),
            timestamp_filter: String::new(),
            type_filter: None,
            page_size: page_size.max(1),
            page_index: 0,
            hidden: BTreeSet::new(),
            selected: BTreeSet::new(),
        }
    }

    /// asc -> desc, anything else -> asc
    pub fn toggle_sort(&mut self, column: ColumnId) {
        if !column_def(column).sortable {
            return;
        }
        self.sort = if self.sort.column == column && !self.sort.desc {
            SortState { column, desc: true }
        } else {
            SortState { column, desc: false }
        };
        self.page_index = 0;
    }

    pub fn set_timestamp_filter(&mut self, text: &str) {
        self.timestamp_filter = text.to_string();
        self.page_index = 0;
    }

    pub fn set_type_filter(&mut self, kind: Option<TransactionType>) {
        self.type_filter = kind;
        self.page_index = 0;
    }

    pub fn clear_type_filter(&mut self) {
        self.set_type_filter(None);
    }

    /// Change the page size, keeping the current top row on screen
    pub fn set_page_size(&mut self, size: usize, options: &[usize]) -> Result<(), CoreError> {
        if !options.contains(&size) {
            return Err(CoreError::InvalidTableState {
                message: format!("page size {} is not one of {:?}", size, options),
            });
        }
        let top_row = self.page_index * self.page_size;
        self.page_index = top_row / size;
        self.page_size = size;
        Ok(())
    }

    pub fn first_page(&mut self) {
        self.page_index = 0;
    }

    pub fn previous_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    pub fn next_page(&mut self, page_count: usize) {
        if self.page_index + 1 < page_count {
            self.page_index += 1;
        }
    }

    pub fn last_page(&mut self, page_count: usize) {
        self.page_index = page_count.saturating_sub(1);
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, page_count: usize) -> bool {
        self.page_index + 1 < page_count
    }

    pub fn is_visible(&self, column: ColumnId) -> bool {
        !self.hidden.contains(&column)
    }

    pub fn toggle_visibility(&mut self, column: ColumnId) {
        if !column_def(column).hideable {
            return;
        }
        if !self.hidden.remove(&column) {
            self.hidden.insert(column);
        }
    }

    pub fn visible_columns(&self) -> Vec<&'static ColumnDef> {
        columns().iter().filter(|c| self.is_visible(c.id)).collect()
    }

    pub fn is_selected(&self, tx_id: &str) -> bool {
        self.selected.contains(tx_id)
    }

    pub fn toggle_row(&mut self, tx_id: &str) {
        if !self.selected.remove(tx_id) {
            self.selected.insert(tx_id.to_string());
        }
    }

    /// Select every row on the page, or clear them all if already selected
    pub fn toggle_all_page_rows(&mut self, page_ids: &[String]) {
        let all_selected = !page_ids.is_empty() && page_ids.iter().all(|id| self.selected.contains(id));
        for id in page_ids {
            if all_selected {
                self.selected.remove(id);
            } else {
                self.selected.insert(id.clone());
            }
        }
    }

    /// Rebuild state from a raw query string; unknown or invalid values fall back to defaults
    pub fn from_query(query: &str, default_page_size: usize, page_size_options: &[usize]) -> Self {
        let (state, rejected) = Self::decode_query(query, default_page_size, page_size_options);
        if let Some(e) = rejected {
            log::debug!("{}; using page size {}", e, state.page_size);
        }
        state
    }

    /// Like `from_query`, but a page size outside `page_size_options` is an error
    pub fn try_from_query(
        query: &str,
        default_page_size: usize,
        page_size_options: &[usize],
    ) -> Result<Self, CoreError> {
        match Self::decode_query(query, default_page_size, page_size_options) {
            (_, Some(e)) => Err(e),
            (state, None) => Ok(state),
        }
    }

    fn decode_query(
        query: &str,
        default_page_size: usize,
        page_size_options: &[usize],
    ) -> (Self, Option<CoreError>) {
        let mut state = Self::new(default_page_size);
        let mut page_index = 0;
        let mut top_row = None;
        let mut rejected = None;

        for (key, value) in parse_query(query) {
            match key.as_str() {
                "sort" => match value.parse::<ColumnId>() {
                    Ok(column) if column_def(column).sortable => state.sort.column = column,
                    _ => log::debug!("ignoring sort column '{}'", value),
                },
                "desc" => state.sort.desc = value == "true",
                "ts" => state.timestamp_filter = value,
                "type" => state.type_filter = value.parse().ok(),
                "page" => page_index = value.parse().unwrap_or(0),
                "top" => top_row = value.parse::<usize>().ok(),
                "size" => {
                    let applied = match value.parse::<usize>() {
                        Ok(size) => state.set_page_size(size, page_size_options),
                        Err(_) => Err(CoreError::InvalidTableState {
                            message: format!("page size '{}' is not a number", value),
                        }),
                    };
                    if let Err(e) = applied {
                        rejected = Some(e);
                    }
                }
                "hidden" => {
                    if let Ok(column) = value.parse::<ColumnId>() {
                        if column_def(column).hideable {
                            state.hidden.insert(column);
                        }
                    }
                }
                "sel" => {
                    state.selected.insert(value);
                }
                _ => {}
            }
        }

        // `top` comes from the page-size control and wins over `page`
        state.page_index = match top_row {
            Some(top) => top / state.page_size,
            None => page_index,
        };
        (state, rejected)
    }

    pub fn to_query(&self) -> String {
        self.to_query_except(&[])
    }

    /// Query string without the given keys, for controls that supply them as form fields
    pub fn to_query_except(&self, skip: &[&str]) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            ("sort", self.sort.column.to_string()),
            ("desc", self.sort.desc.to_string()),
        ];
        if !self.timestamp_filter.is_empty() {
            pairs.push(("ts", self.timestamp_filter.clone()));
        }
        if let Some(kind) = self.type_filter {
            pairs.push(("type", kind.to_string()));
        }
        pairs.push(("page", self.page_index.to_string()));
        pairs.push(("size", self.page_size.to_string()));
        for column in &self.hidden {
            pairs.push(("hidden", column.to_string()));
        }
        for id in &self.selected {
            pairs.push(("sel", id.clone()));
        }

        pairs
            .iter()
            .filter(|(k, _)| !skip.contains(k))
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn matches(&self, tx: &Transaction) -> bool {
        if !self.timestamp_filter.is_empty()
            && !tx.timestamp.to_lowercase().contains(&self.timestamp_filter.to_lowercase())
        {
            return false;
        }
        match self.type_filter {
            Some(kind) => tx.kind == kind.as_str(),
            None => true,
        }
    }
}

/// Split a query string into decoded pairs, keeping repeated keys
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let decode = |s: &str| {
        let s = s.replace('+', " ");
        urlencoding::decode(&s)
            .map(|d| d.into_owned())
            .unwrap_or(s)
    };

    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode(k), decode(v)),
            None => (decode(pair), String::new()),
        })
        .collect()
}

// ==================== View ====================

/// One page of the table, ready to render
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    /// State with `page_index` clamped into range
    pub state: TableState,
    pub rows: Vec<&'a Transaction>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub page_count: usize,
    /// Selected rows that survive the current filters
    pub selected_count: usize,
    pub all_page_rows_selected: bool,
    pub some_page_rows_selected: bool,
}

impl<'a> TableView<'a> {
    pub fn can_previous(&self) -> bool {
        self.state.can_previous()
    }

    pub fn can_next(&self) -> bool {
        self.state.can_next(self.page_count)
    }

    /// `Page 1 of 1` for an empty table
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.state.page_index + 1, self.page_count.max(1))
    }

    pub fn selection_label(&self) -> String {
        format!("{} of {} row(s) selected.", self.selected_count, self.rows.len())
    }

    pub fn page_ids(&self) -> Vec<String> {
        self.rows.iter().map(|tx| tx.tx_id.clone()).collect()
    }
}

pub struct TableModel;

impl TableModel {
    /// Filter, sort and slice `rows` according to `state`
    pub fn build<'a>(rows: &'a [Transaction], state: &TableState) -> TableView<'a> {
        let mut filtered: Vec<&Transaction> = rows.iter().filter(|tx| state.matches(tx)).collect();

        let sort = state.sort;
        filtered.sort_by(|a, b| {
            let ord = compare_rows(sort.column, a, b);
            if sort.desc { ord.reverse() } else { ord }
        });

        let page_size = state.page_size.max(1);
        let filtered_count = filtered.len();
        let page_count = filtered_count.div_ceil(page_size);

        let mut state = state.clone();
        state.page_size = page_size;
        state.page_index = state.page_index.min(page_count.saturating_sub(1));

        let selected_count = filtered.iter().filter(|tx| state.is_selected(&tx.tx_id)).count();

        let start = state.page_index * page_size;
        let page: Vec<&Transaction> = filtered.into_iter().skip(start).take(page_size).collect();

        let page_selected = page.iter().filter(|tx| state.is_selected(&tx.tx_id)).count();

        TableView {
            all_page_rows_selected: !page.is_empty() && page_selected == page.len(),
            some_page_rows_selected: page_selected > 0 && page_selected < page.len(),
            total_count: rows.len(),
            state,
            rows: page,
            filtered_count,
            page_count,
            selected_count,
        }
    }
}
