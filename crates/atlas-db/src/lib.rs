//! Storage layer for atlas.
//!
//! A small SQL query builder on top of diesel's SQLite backend, a generic
//! configuration driven [`Repository`], join-table synchronisation and the
//! continent/country schema with its migrations and seed data.

pub mod connection;
pub mod error;
pub mod expr;
pub mod heartbeat;
pub mod helpers;
pub mod join_table;
pub mod macros;
pub mod migration;
pub mod models;
pub mod query;
pub mod record;
pub mod repository;
pub mod schema;
pub mod seed;
pub mod traits;
pub mod transaction;
pub mod value;

pub use connection::{ConnectionOptions, DbConnection};
pub use diesel::SqliteConnection;
pub use error::{DbError, Result};
pub use query::*;
pub use record::Record;
pub use repository::{Entity, Repository, RepositoryConfig};
pub use value::SqlValue;

#[cfg(test)]
mod tests {
    use diesel::{
        sql_query,
        sql_types::{BigInt, Nullable, Text},
        QueryableByName, RunQueryDsl,
    };

    use super::*;
    use crate::traits::Expression as _;

    #[derive(Debug, Clone, QueryableByName)]
    struct City {
        #[diesel(sql_type = BigInt)]
        id: i64,
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = BigInt)]
        population: i64,
        #[diesel(sql_type = Nullable<Text>)]
        nickname: Option<String>,
    }

    #[derive(Debug, Clone, QueryableByName)]
    struct CityName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    define_entity!(
        cities {
            table: "cities",
            columns: {
                ID: i64 => "id",
                NAME: String => "name",
                POPULATION: i64 => "population",
                NICKNAME: Option<String> => "nickname"
            }
        }
    );

    fn setup_db() -> DbConnection {
        let mut db = DbConnection::open_in_memory().unwrap();
        sql_query(
            "CREATE TABLE cities (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                population INTEGER NOT NULL DEFAULT 0,
                nickname TEXT
            )",
        )
        .execute(db.conn())
        .unwrap();
        db
    }

    #[test]
    fn test_define_entity() {
        assert_eq!(cities::TABLE, "cities");
        assert_eq!(cities::COLUMNS, &["id", "name", "population", "nickname"]);
        assert_eq!(cities::NICKNAME.name(), "nickname");
    }

    #[test]
    fn test_insert_and_select() {
        let mut db = setup_db();

        let inserted = InsertQuery::into(cities::TABLE)
            .set(cities::NAME, "Lisbon")
            .set(cities::POPULATION, 545_000)
            .set(cities::NICKNAME, "City of Seven Hills")
            .execute(db.conn())
            .unwrap();
        assert_eq!(inserted, 1);

        let city = SelectQuery::<City>::from(cities::TABLE)
            .filter(cities::NAME.eq("Lisbon"))
            .fetch_one(db.conn())
            .unwrap()
            .unwrap();

        assert!(city.id > 0);
        assert_eq!(city.population, 545_000);
        assert_eq!(city.nickname.as_deref(), Some("City of Seven Hills"));
    }

    #[test]
    fn test_multi_row_insert_fills_missing_columns_with_null() {
        let mut db = setup_db();

        let rows = vec![
            Record::new().with("name", "Porto").with("nickname", "Invicta"),
            Record::new().with("name", "Braga").with("population", 193_000),
        ];
        let query = InsertQuery::into(cities::TABLE).rows(rows);
        let (sql, params) = query.build_sql();
        assert_eq!(
            sql,
            r#"INSERT INTO "cities" ("name", "nickname", "population") VALUES (?, ?, ?), (?, ?, ?)"#
        );
        assert_eq!(params[2], SqlValue::Null);
        assert_eq!(params[4], SqlValue::Null);

        // NULL into a NOT NULL column with a default is still a constraint error.
        assert!(query.execute(db.conn()).is_err());
    }

    #[test]
    fn test_insert_returning() {
        let mut db = setup_db();

        let created: Vec<City> = InsertQuery::into(cities::TABLE)
            .rows([
                Record::new().with("name", "Faro").with("population", 64_000),
                Record::new().with("name", "Evora").with("population", 57_000),
            ])
            .returning::<&str>(&[])
            .fetch(db.conn())
            .unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[0].name, "Faro");
        assert_eq!(created[1].name, "Evora");
    }

    #[test]
    fn test_select_with_like() {
        let mut db = setup_db();

        InsertQuery::into(cities::TABLE)
            .rows([
                Record::new().with("name", "Coimbra").with("population", 140_000),
                Record::new().with("name", "Aveiro").with("population", 80_000),
            ])
            .execute(db.conn())
            .unwrap();

        let names = SelectQuery::<CityName>::from(cities::TABLE)
            .select(&[cities::NAME])
            .filter(cities::NAME.like("mbr"))
            .fetch(db.conn())
            .unwrap();

        assert_eq!(names.len(), 1);
        assert_eq!(names[0].name, "Coimbra");
    }

    #[test]
    fn test_update_delete_and_count() {
        let mut db = setup_db();

        InsertQuery::into(cities::TABLE)
            .rows((1..=5).map(|i| {
                Record::new()
                    .with("name", format!("town-{i}"))
                    .with("population", i * 1000)
            }))
            .execute(db.conn())
            .unwrap();

        let updated = UpdateQuery::table(cities::TABLE)
            .set(cities::NICKNAME, "small")
            .filter(cities::POPULATION.lt(3000))
            .execute(db.conn())
            .unwrap();
        assert_eq!(updated, 2);

        let small = SelectQuery::<City>::from(cities::TABLE)
            .filter(cities::NICKNAME.not_null())
            .count(db.conn())
            .unwrap();
        assert_eq!(small, 2);

        let deleted = DeleteQuery::from(cities::TABLE)
            .filter(cities::ID.in_([1, 2, 3]))
            .execute(db.conn())
            .unwrap();
        assert_eq!(deleted, 3);

        let remaining = SelectQuery::<City>::from(cities::TABLE)
            .order_by(cities::POPULATION, true)
            .fetch(db.conn())
            .unwrap();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].name, "town-5");
    }

    #[test]
    fn test_offset_without_limit() {
        let (sql, _) = SelectQuery::<City>::from(cities::TABLE).offset(5).build_sql();
        assert_eq!(sql, r#"SELECT * FROM "cities" LIMIT -1 OFFSET 5"#);
    }

    #[test]
    fn test_page_offset_saturates() {
        let (sql, _) = SelectQuery::<City>::from(cities::TABLE).page(3, 10).build_sql();
        assert_eq!(sql, r#"SELECT * FROM "cities" LIMIT 10 OFFSET 20"#);

        let (sql, _) = SelectQuery::<City>::from(cities::TABLE)
            .page((1 << 60) + 1, 16)
            .build_sql();
        assert_eq!(
            sql,
            format!(r#"SELECT * FROM "cities" LIMIT 16 OFFSET {}"#, i64::MAX)
        );
    }
}
