//! Edit-log ingestion module

pub mod csv;

pub use csv::load_edit_log;

/// One row of the tabular edit log: an editor touched an item.
///
/// Only `item` and `editor` drive the analysis; the timestamp is carried
/// through for completeness of the log but never read downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    /// Identifier of the edited item
    pub item: String,

    /// Identifier of the editor
    pub editor: String,

    /// Revision timestamp, if the log carries one
    pub timestamp: Option<String>,
}
