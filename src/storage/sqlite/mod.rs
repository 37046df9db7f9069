pub(crate) mod migration;
#[allow(clippy::module_inception)]
pub mod sqlite;

pub use sqlite::Sqlite;
