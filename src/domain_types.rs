pub mod snapshot;
pub mod types;

pub use snapshot::{SchemaError, SnapshotRecord, SnapshotSchema, SnapshotTable};
pub use types::{ColumnName, Engine, NullDatePolicy, QueryStyle, SelectionPolicy, TieBreak};
