//! Session layer: one actor task per table, commands in, snapshot
//! broadcasts out.

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use messages::{TableClosed, TableCommand};
