//! Column definitions for the ledger table
//!
//! Each column states how its header and cells render and which table
//! features (sorting, filtering, hiding) apply to it. Renderers read these
//! definitions instead of hard-coding per-column behavior.

use lunacy_feed::Transaction;
use lunacy_utils::format_price;
use serde::{Deserialize, Serialize};

/// Stable column identifiers, also used in query strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnId {
    #[serde(rename = "select")]
    Select,
    #[serde(rename = "txID")]
    TxId,
    #[serde(rename = "timestamp")]
    Timestamp,
    #[serde(rename = "method")]
    Method,
    #[serde(rename = "source")]
    Source,
    #[serde(rename = "destination")]
    Destination,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "amount")]
    Amount,
    #[serde(rename = "balance")]
    Balance,
    #[serde(rename = "actions")]
    Actions,
}

impl ColumnId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Select => "select",
            ColumnId::TxId => "txID",
            ColumnId::Timestamp => "timestamp",
            ColumnId::Method => "method",
            ColumnId::Source => "source",
            ColumnId::Destination => "destination",
            ColumnId::Type => "type",
            ColumnId::Amount => "amount",
            ColumnId::Balance => "balance",
            ColumnId::Actions => "actions",
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ColumnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COLUMNS
            .iter()
            .map(|c| c.id)
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown column: {}", s))
    }
}

/// How a column header renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// Tri-state checkbox over the current page
    SelectAll,
    /// Label that toggles sorting when clicked
    SortToggle(&'static str),
    /// Plain label
    Label(&'static str),
    /// Nothing
    Empty,
}

/// How a column's cells render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Row selection checkbox
    SelectRow,
    /// Raw string value
    Text,
    /// String value, blank when absent
    OptionalText,
    /// Right-aligned USD amount
    Currency,
    /// Per-row actions menu
    Actions,
}

/// Which filter control a column supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    None,
    /// Case-insensitive substring match
    Text,
    /// Exact match against one category
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub id: ColumnId,
    pub header: HeaderKind,
    pub cell: CellKind,
    pub sortable: bool,
    pub filter: FilterKind,
    pub hideable: bool,
}

impl ColumnDef {
    pub fn filterable(&self) -> bool {
        self.filter != FilterKind::None
    }

    /// Label used in the column visibility menu
    pub fn menu_label(&self) -> &'static str {
        self.id.as_str()
    }

    pub fn is_numeric(&self) -> bool {
        self.cell == CellKind::Currency
    }
}

const fn column(
    id: ColumnId,
    header: HeaderKind,
    cell: CellKind,
    sortable: bool,
    filter: FilterKind,
    hideable: bool,
) -> ColumnDef {
    ColumnDef { id, header, cell, sortable, filter, hideable }
}

/// Display columns in table order
pub const COLUMNS: [ColumnDef; 10] = [
    column(ColumnId::Select, HeaderKind::SelectAll, CellKind::SelectRow, false, FilterKind::None, false),
    column(ColumnId::TxId, HeaderKind::SortToggle("Tx#"), CellKind::Text, true, FilterKind::None, true),
    column(ColumnId::Timestamp, HeaderKind::Label("Timestamp"), CellKind::Text, false, FilterKind::Text, true),
    column(ColumnId::Method, HeaderKind::Label("Method"), CellKind::OptionalText, false, FilterKind::None, true),
    column(ColumnId::Source, HeaderKind::Label("Source"), CellKind::OptionalText, false, FilterKind::None, true),
    column(ColumnId::Destination, HeaderKind::Label("Destination"), CellKind::OptionalText, false, FilterKind::None, true),
    column(ColumnId::Type, HeaderKind::Label("Type"), CellKind::Text, false, FilterKind::Category, true),
    column(ColumnId::Amount, HeaderKind::Label("Amount"), CellKind::Currency, false, FilterKind::None, true),
    column(ColumnId::Balance, HeaderKind::Label("Balance"), CellKind::Currency, false, FilterKind::None, true),
    column(ColumnId::Actions, HeaderKind::Empty, CellKind::Actions, false, FilterKind::None, true),
];

pub fn columns() -> &'static [ColumnDef] {
    &COLUMNS
}

pub fn column_def(id: ColumnId) -> &'static ColumnDef {
    // COLUMNS lists every ColumnId variant
    COLUMNS.iter().find(|c| c.id == id).unwrap_or(&COLUMNS[0])
}

/// Raw value of a column for a row, before any display formatting
pub fn raw_value(id: ColumnId, tx: &Transaction) -> Option<String> {
    match id {
        ColumnId::TxId => Some(tx.tx_id.clone()),
        ColumnId::Timestamp => Some(tx.timestamp.clone()),
        ColumnId::Method => tx.method.clone(),
        ColumnId::Source => tx.source.clone(),
        ColumnId::Destination => tx.destination.clone(),
        ColumnId::Type => Some(tx.kind.clone()),
        ColumnId::Amount => Some(tx.amount.to_string()),
        ColumnId::Balance => Some(tx.balance.to_string()),
        ColumnId::Select | ColumnId::Actions => None,
    }
}

/// Display text of a cell; empty for control cells and absent values
pub fn cell_value(id: ColumnId, tx: &Transaction) -> String {
    match column_def(id).cell {
        CellKind::Text | CellKind::OptionalText => raw_value(id, tx).unwrap_or_default(),
        CellKind::Currency => match id {
            ColumnId::Amount => format_price(tx.amount),
            _ => format_price(tx.balance),
        },
        CellKind::SelectRow | CellKind::Actions => String::new(),
    }
}
