//! Spreadsheet-to-catalog import.
//!
//! Turns an uploaded `.csv`/`.xlsx` file into product templates, attributes
//! and variants:
//!
//! ```text
//! Upload ──decode──▶ bytes ──read_table──▶ Table ──ImportRow::collect──▶ rows
//!        ──group_by_style──▶ groups ──ProductImportWizard──▶ catalog records
//! ```

pub mod error;
pub mod matching;
pub mod notification;
pub mod rows;
pub mod sheet;
pub mod upload;
pub mod wizard;

pub use error::ImportError;
pub use matching::VariantRowIndex;
pub use notification::{ClientNotification, FollowUpAction, Severity};
pub use rows::{ImportRow, StyleGroup, group_by_style};
pub use sheet::{Table, read_table};
pub use upload::{FileFormat, Upload};
pub use wizard::{ImportReport, ProductImportWizard};
