//! Continent seed data.

use diesel::SqliteConnection;
use tracing::info;

use crate::{
    error::Result,
    models::{ContinentFilters, NewContinent},
    repository::{ContinentRepository, CreateBulkParams},
    transaction::transaction,
};

/// `(id, code, name)` for every continent.
pub const CONTINENTS: [(&str, &str, &str); 7] = [
    ("e21134c7-bfde-459a-8ac2-dcdecf5ae8ed", "AF", "Africa"),
    ("8f767f57-2bf3-4586-9801-196304bb50df", "AN", "Antarctica"),
    ("2fba2034-cf75-4d04-8a3f-43d71a54a66f", "AS", "Asia"),
    ("c0114ffd-46bd-420a-b706-bf1b900f6fee", "EU", "Europe"),
    ("c8ee8e53-92ef-43e8-92f6-858a4296a0f2", "NA", "North America"),
    ("199d31d3-b6fb-4a7d-b5d6-889038079323", "OC", "Oceania"),
    ("d4a2b1a0-1786-43d8-80ba-363d2f6892c2", "SA", "South America"),
];

/// Replaces the continent table contents with [`CONTINENTS`].
pub fn seed_continents(conn: &mut SqliteConnection) -> Result<usize> {
    let repo = ContinentRepository::repository();
    let rows: Vec<NewContinent> = CONTINENTS
        .iter()
        .map(|(id, code, name)| NewContinent {
            continent_id: id.to_string(),
            continent_code: code.to_string(),
            continent_name: name.to_string(),
        })
        .collect();

    let inserted = transaction(conn, |conn| {
        let removed = repo.delete_by_criteria(conn, &ContinentFilters::default())?;
        info!(removed, "cleared continents");
        repo.create_bulk_no_returning(conn, &rows, CreateBulkParams::default())
    })?;

    info!(inserted, "seeded continents");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connection::DbConnection, repository::Page};

    #[test]
    fn test_seed_is_repeatable() {
        let mut db = DbConnection::open_in_memory().unwrap();

        assert_eq!(seed_continents(db.conn()).unwrap(), 7);
        assert_eq!(seed_continents(db.conn()).unwrap(), 7);

        let continents = ContinentRepository::list(db.conn(), Page::default()).unwrap();
        assert_eq!(continents.len(), 7);
        // ordered by id
        assert_eq!(continents[0].continent_code, "OC");
        assert_eq!(continents[6].continent_code, "AF");
    }
}
