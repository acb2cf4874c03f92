//! Column references.
//!
//! `Col<T>` ties a column name to the Rust type stored in it. Schema modules
//! declare them as constants; the generic repository builds them at runtime
//! from configured column names, which is why the name is a `Cow`.

use std::{borrow::Cow, marker::PhantomData};

use crate::{helpers::quote_ident, traits::Expression, value::SqlValue};

/// A typed reference to a database column.
///
/// The type parameter is not enforced at runtime; it documents what the
/// column holds and keeps schema constants from being mixed up.
///
/// ```rust
/// use atlas_db::expr::Col;
/// const NAME: Col<String> = Col::new("country_name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Col<T> {
    name: Cow<'static, str>,
    _type: PhantomData<T>,
}

impl<T> Col<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _type: PhantomData,
        }
    }

    /// A column whose name is only known at runtime.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The quoted identifier used in SELECT lists and ORDER BY.
    pub fn select_expr(&self) -> String {
        quote_ident(&self.name)
    }
}

impl<T> Expression for Col<T> {
    fn to_sql(&self, _params: &mut Vec<SqlValue>) -> String {
        self.select_expr()
    }
}
