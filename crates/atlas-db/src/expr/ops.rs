//! SQL expression operators.
//!
//! Each operator wraps a left-hand expression and renders itself around the
//! fragment that expression produces.

use crate::{
    helpers::quote_ident,
    record::Record,
    traits::Expression,
    value::SqlValue,
};

/// A binary comparison (`=`, `>`, `<=` ...).
pub struct BinaryOp<L> {
    left: L,
    op: &'static str,
    right: SqlValue,
}

impl<L> BinaryOp<L> {
    pub fn new(left: L, op: &'static str, right: SqlValue) -> Self {
        Self {
            left,
            op,
            right,
        }
    }
}

impl<L: Expression> Expression for BinaryOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(self.right.clone());
        format!("{} {} ?", left_sql, self.op)
    }
}

/// `LIKE` or case-insensitive `LIKE`.
pub struct LikeOp<L> {
    left: L,
    pattern: String,
    case_insensitive: bool,
}

impl<L> LikeOp<L> {
    pub const fn new(left: L, pattern: String, case_insensitive: bool) -> Self {
        Self {
            left,
            pattern,
            case_insensitive,
        }
    }
}

impl<L: Expression> Expression for LikeOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        params.push(format!("%{}%", self.pattern).into());
        if self.case_insensitive {
            format!("LOWER({}) LIKE LOWER(?)", left_sql)
        } else {
            format!("{} LIKE ?", left_sql)
        }
    }
}

/// `IN` or `NOT IN`.
pub struct InOp<L> {
    left: L,
    values: Vec<SqlValue>,
    negated: bool,
}

impl<L> InOp<L> {
    pub fn new(left: L, values: Vec<SqlValue>, negated: bool) -> Self {
        Self {
            left,
            values,
            negated,
        }
    }
}

impl<L: Expression> Expression for InOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        // `x IN ()` is not valid SQLite.
        if self.values.is_empty() {
            return if self.negated { "1 = 1" } else { "1 = 0" }.to_string();
        }

        let left_sql = self.left.to_sql(params);
        let placeholders = vec!["?"; self.values.len()].join(", ");
        params.extend(self.values.iter().cloned());
        let op = if self.negated { "NOT IN" } else { "IN" };
        format!("{} {} ({})", left_sql, op, placeholders)
    }
}

/// `IS NULL` or `IS NOT NULL`.
pub struct NullOp<L> {
    left: L,
    is_null: bool,
}

impl<L> NullOp<L> {
    pub fn new(left: L, is_null: bool) -> Self {
        Self {
            left,
            is_null,
        }
    }
}

impl<L: Expression> Expression for NullOp<L> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        let op = if self.is_null {
            "IS NULL"
        } else {
            "IS NOT NULL"
        };
        format!("{} {}", left_sql, op)
    }
}

/// Two expressions joined with `AND` or `OR`.
pub struct LogicalOp<L, R> {
    left: L,
    right: R,
    op: &'static str,
}

impl<L, R> LogicalOp<L, R> {
    pub fn new(left: L, right: R, op: &'static str) -> Self {
        Self {
            left,
            right,
            op,
        }
    }
}

impl<L: Expression, R: Expression> Expression for LogicalOp<L, R> {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        let left_sql = self.left.to_sql(params);
        let right_sql = self.right.to_sql(params);
        format!("({} {} {})", left_sql, self.op, right_sql)
    }
}

/// Equality on every column of a record, `AND`-joined.
///
/// `Null` values match with `IS NULL`. An empty record matches every row.
#[derive(Debug, Clone)]
pub struct RecordEq(pub Record);

impl Expression for RecordEq {
    fn to_sql(&self, params: &mut Vec<SqlValue>) -> String {
        if self.0.is_empty() {
            return "1 = 1".to_string();
        }

        let conditions: Vec<String> = self
            .0
            .iter()
            .map(|(column, value)| {
                if value.is_null() {
                    format!("{} IS NULL", quote_ident(column))
                } else {
                    params.push(value.clone());
                    format!("{} = ?", quote_ident(column))
                }
            })
            .collect();

        if conditions.len() == 1 {
            conditions.into_iter().collect()
        } else {
            format!("({})", conditions.join(" AND "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Col;

    const CODE: Col<String> = Col::new("country_code");
    const AREA: Col<i64> = Col::new("area");

    #[test]
    fn test_binary_and_logical() {
        let mut params = vec![];
        let sql = CODE.eq("FR").and(AREA.gte(1000).or(AREA.null())).to_sql(&mut params);

        assert_eq!(
            sql,
            r#"("country_code" = ? AND ("area" >= ? OR "area" IS NULL))"#
        );
        assert_eq!(
            params,
            vec![SqlValue::Text("FR".into()), SqlValue::Integer(1000)]
        );
    }

    #[test]
    fn test_like() {
        let mut params = vec![];
        assert_eq!(CODE.ilike("f").to_sql(&mut params), r#"LOWER("country_code") LIKE LOWER(?)"#);
        assert_eq!(params, vec![SqlValue::Text("%f%".into())]);
    }

    #[test]
    fn test_in_op() {
        let mut params = vec![];
        let sql = CODE.in_(["FR", "DE"]).to_sql(&mut params);
        assert_eq!(sql, r#""country_code" IN (?, ?)"#);
        assert_eq!(params.len(), 2);

        let mut params = vec![];
        assert_eq!(CODE.in_(Vec::<String>::new()).to_sql(&mut params), "1 = 0");
        assert_eq!(CODE.not_in(Vec::<String>::new()).to_sql(&mut params), "1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_record_eq_renders_nulls_as_is_null() {
        let filter = RecordEq(
            Record::new()
                .with("continent_code", "EU")
                .with("capital", SqlValue::Null),
        );
        let mut params = vec![];

        assert_eq!(
            filter.to_sql(&mut params),
            r#"("continent_code" = ? AND "capital" IS NULL)"#
        );
        assert_eq!(params, vec![SqlValue::Text("EU".into())]);
    }

    #[test]
    fn test_record_eq_empty_matches_everything() {
        let mut params = vec![];
        assert_eq!(RecordEq(Record::new()).to_sql(&mut params), "1 = 1");
    }
}
