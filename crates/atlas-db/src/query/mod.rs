//! The query builder.
//!
//! Each statement kind has its own builder with chainable methods. Builders
//! render SQL with `?` placeholders plus an ordered list of [`SqlValue`]s,
//! and bind those values through diesel when executed against a
//! [`diesel::SqliteConnection`].
//!
//! - [`SelectQuery`]: columns, filters, ordering, limit/offset and paging.
//! - [`InsertQuery`]: one or many rows, optional `RETURNING`.
//! - [`UpdateQuery`]: `SET` from a record, filters, optional `RETURNING`.
//! - [`DeleteQuery`]: filters.
//!
//! [`SqlValue`]: crate::value::SqlValue

mod bind;
pub mod clause;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;

pub(crate) use bind::bind_values;
