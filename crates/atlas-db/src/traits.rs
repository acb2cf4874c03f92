//! Core traits that power the query builder.

use crate::{
    expr::ops::{BinaryOp, InOp, LikeOp, LogicalOp, NullOp},
    value::SqlValue,
};

/// A type that renders to an SQL fragment.
///
/// Implementors include [`crate::expr::Col`] and the operator types in
/// [`crate::expr::ops`]. Rendering appends bound values to `params` in the
/// order their `?` placeholders appear in the returned fragment.
///
/// ```rust
/// use atlas_db::{expr::Col, traits::Expression as _, SqlValue};
///
/// let code = Col::<String>::new("country_code");
/// let mut params = vec![];
/// let sql = code.eq("FR").to_sql(&mut params);
///
/// assert_eq!(sql, r#""country_code" = ?"#);
/// assert_eq!(params, vec![SqlValue::Text("FR".into())]);
/// ```
pub trait Expression: Sized {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String;

    fn eq<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "=", value.into())
    }

    fn ne<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "!=", value.into())
    }

    fn gt<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, ">", value.into())
    }

    fn lt<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "<", value.into())
    }

    fn gte<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, ">=", value.into())
    }

    fn lte<T: Into<SqlValue>>(self, value: T) -> BinaryOp<Self> {
        BinaryOp::new(self, "<=", value.into())
    }

    /// Substring match: the pattern is wrapped in `%`.
    fn like(self, pattern: impl Into<String>) -> LikeOp<Self> {
        LikeOp::new(self, pattern.into(), false)
    }

    /// Case-insensitive substring match.
    fn ilike(self, pattern: impl Into<String>) -> LikeOp<Self> {
        LikeOp::new(self, pattern.into(), true)
    }

    /// `IN (..)`. An empty list renders a condition that never matches.
    fn in_<T, I>(self, values: I) -> InOp<Self>
    where
        T: Into<SqlValue>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(Into::into).collect();
        InOp::new(self, values, false)
    }

    fn not_in<T, I>(self, values: I) -> InOp<Self>
    where
        T: Into<SqlValue>,
        I: IntoIterator<Item = T>,
    {
        let values = values.into_iter().map(Into::into).collect();
        InOp::new(self, values, true)
    }

    fn null(self) -> NullOp<Self> {
        NullOp::new(self, true)
    }

    fn not_null(self) -> NullOp<Self> {
        NullOp::new(self, false)
    }

    fn and<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "AND")
    }

    fn or<E: Expression>(self, other: E) -> LogicalOp<Self, E> {
        LogicalOp::new(self, other, "OR")
    }
}
