//! Schema-driven connect sheet.

pub mod conditional;
pub mod schema;
pub mod session;
pub mod steps;
pub mod types;

pub use schema::{connect_schema, ConnectSchema};
pub use session::{ConnectSession, InitialState, SheetAction, SheetView};
pub use types::{ConnectMode, ConnectState, FieldId, FieldValue};
