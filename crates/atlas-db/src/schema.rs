//! Table and column declarations for the reference data tables.

use crate::define_entity;

define_entity!(
    continent {
        table: "continent",
        columns: {
            CONTINENT_ID: String => "continent_id",
            CONTINENT_CODE: String => "continent_code",
            CONTINENT_NAME: String => "continent_name",
        }
    }
);

define_entity!(
    country {
        table: "country",
        columns: {
            COUNTRY_ID: String => "country_id",
            COUNTRY_CODE: String => "country_code",
            COUNTRY_CODE3: String => "country_code3",
            COUNTRY_NAME: String => "country_name",
            CAPITAL: Option<String> => "capital",
            CONTINENT_CODE: String => "continent_code",
            AREA: Option<i64> => "area",
            POPULATION: Option<i64> => "population",
            LATITUDE: Option<f64> => "latitude",
            LONGITUDE: Option<f64> => "longitude",
            CURRENCY_CODE: Option<String> => "currency_code",
            CURRENCY_NAME: Option<String> => "currency_name",
            LANGUAGES: String => "languages",
        }
    }
);
