use diesel::SqliteConnection;

use super::generic::{Entity, GetParams, Page, Repository, RepositoryConfig, SortingParam};
use crate::{
    error::Result,
    models::{Country, CountryFilters, CountryUpdate, NewCountry},
    schema::country,
};

impl Entity for Country {
    type New = NewCountry;
    type Update = CountryUpdate;
    type Filters = CountryFilters;
}

/// Country table access.
pub struct CountryRepository;

impl CountryRepository {
    pub fn config() -> RepositoryConfig {
        let updatable: Vec<&str> = country::COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != country::COUNTRY_ID.name())
            .collect();

        RepositoryConfig::new(country::TABLE, country::COUNTRY_ID.name())
            .default_order_by(vec![SortingParam::asc(country::COUNTRY_NAME.name())])
            .columns_to_fetch(country::COLUMNS)
            .columns_for_create(country::COLUMNS)
            .columns_for_update(&updatable)
            .columns_for_filters(&[
                country::COUNTRY_CODE.name(),
                country::CONTINENT_CODE.name(),
            ])
    }

    pub fn repository() -> Repository<Country> {
        Repository::new(Self::config())
    }

    /// A page of the countries on one continent.
    pub fn list_by_continent(
        conn: &mut SqliteConnection,
        continent_code: &str,
        params: &GetParams,
        page: Page,
    ) -> Result<Vec<Country>> {
        let filters = CountryFilters::by_continent_code(continent_code);
        Self::repository().get_by_criteria(conn, Some(&filters), params, page)
    }

    /// The country with the given two-letter code, failing when several match.
    pub fn find_by_code(conn: &mut SqliteConnection, country_code: &str) -> Result<Option<Country>> {
        let filters = CountryFilters::by_country_code(country_code);
        Self::repository().get_single_by_criteria(conn, &filters, &GetParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connection::DbConnection, error::DbError, repository::CreateBulkParams};

    fn sample(code: &str, code3: &str, name: &str, continent: &str) -> NewCountry {
        NewCountry {
            country_id: crate::models::new_id(),
            country_code: code.into(),
            country_code3: code3.into(),
            country_name: name.into(),
            capital: None,
            continent_code: continent.into(),
            area: Some(1000),
            population: None,
            latitude: Some(46.5),
            longitude: Some(2.0),
            currency_code: Some("EUR".into()),
            currency_name: None,
            languages: "xx".into(),
        }
    }

    fn setup() -> DbConnection {
        let mut db = DbConnection::open_in_memory().unwrap();
        let rows = vec![
            sample("FR", "FRA", "France", "EU"),
            sample("DE", "DEU", "Germany", "EU"),
            sample("AT", "AUT", "Austria", "EU"),
            sample("JP", "JPN", "Japan", "AS"),
        ];
        CountryRepository::repository()
            .create_bulk_no_returning(db.conn(), &rows, CreateBulkParams::default())
            .unwrap();
        db
    }

    #[test]
    fn test_list_by_continent_default_order() {
        let mut db = setup();
        let countries =
            CountryRepository::list_by_continent(db.conn(), "EU", &GetParams::default(), Page::default())
                .unwrap();

        let names: Vec<_> = countries.iter().map(|c| c.country_name.as_str()).collect();
        assert_eq!(names, vec!["Austria", "France", "Germany"]);
        assert_eq!(countries[1].latitude, Some(46.5));
        assert_eq!(countries[1].longitude, Some(2.0));
    }

    #[test]
    fn test_list_by_continent_custom_sort_and_page() {
        let mut db = setup();
        let params = GetParams::sorted_by(vec![SortingParam::desc("country_code")]);

        let countries =
            CountryRepository::list_by_continent(db.conn(), "EU", &params, Page::new(2, 2)).unwrap();

        let codes: Vec<_> = countries.iter().map(|c| c.country_code.as_str()).collect();
        assert_eq!(codes, vec!["AT"]);
    }

    #[test]
    fn test_find_by_code() {
        let mut db = setup();

        let japan = CountryRepository::find_by_code(db.conn(), "JP").unwrap().unwrap();
        assert_eq!(japan.country_code3, "JPN");
        assert!(CountryRepository::find_by_code(db.conn(), "XX").unwrap().is_none());

        CountryRepository::repository()
            .create(db.conn(), &sample("JP", "JPN", "Japan again", "AS"))
            .unwrap();
        let err = CountryRepository::find_by_code(db.conn(), "JP").unwrap_err();
        assert!(matches!(err, DbError::NonUniqueResult { .. }));
    }

    #[test]
    fn test_update_cannot_touch_the_id() {
        let config = CountryRepository::config();
        let update_columns = config.columns_for_update.unwrap();
        assert_eq!(update_columns.len(), 12);
        assert!(!update_columns.contains(&"country_id".to_string()));
    }
}
