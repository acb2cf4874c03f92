//! Macros for declaring table schemas.

/// Declares a module holding the table name, its column list and one typed
/// [`Col`](crate::expr::Col) constant per column.
///
/// ```ignore
/// define_entity!(
///     continent {
///         table: "continent",
///         columns: {
///             CONTINENT_ID: String => "continent_id",
///             CONTINENT_CODE: String => "continent_code",
///         }
///     }
/// );
///
/// assert_eq!(continent::TABLE, "continent");
/// assert_eq!(continent::COLUMNS, &["continent_id", "continent_code"]);
/// ```
#[macro_export]
macro_rules! define_entity {
    (
        $entity:ident {
            table: $table:literal,
            columns: {
                $($col_name:ident: $col_type:ty => $db_col:literal),* $(,)?
            }
        }
    ) => {
        pub mod $entity {
            use $crate::expr::column::Col;

            pub const TABLE: &str = $table;

            /// Every column, in declaration order.
            pub const COLUMNS: &[&str] = &[$($db_col),*];

            $(
                pub const $col_name: Col<$col_type> = Col::new($db_col);
            )*
        }
    };
}
