use diesel::SqliteConnection;

use super::generic::{Entity, GetParams, Page, Repository, RepositoryConfig, SortingParam};
use crate::{
    error::Result,
    models::{Continent, ContinentFilters, ContinentUpdate, NewContinent},
    schema::continent,
};

impl Entity for Continent {
    type New = NewContinent;
    type Update = ContinentUpdate;
    type Filters = ContinentFilters;
}

/// Continent table access.
pub struct ContinentRepository;

impl ContinentRepository {
    pub fn config() -> RepositoryConfig {
        RepositoryConfig::new(continent::TABLE, continent::CONTINENT_ID.name())
            .default_order_by(vec![SortingParam::asc(continent::CONTINENT_ID.name())])
            .columns_to_fetch(continent::COLUMNS)
            .columns_for_create(continent::COLUMNS)
            .columns_for_update(&[
                continent::CONTINENT_CODE.name(),
                continent::CONTINENT_NAME.name(),
            ])
            .columns_for_filters(continent::COLUMNS)
    }

    pub fn repository() -> Repository<Continent> {
        Repository::new(Self::config())
    }

    pub fn list(conn: &mut SqliteConnection, page: Page) -> Result<Vec<Continent>> {
        Self::repository().get_by_criteria(conn, None, &GetParams::default(), page)
    }
}
