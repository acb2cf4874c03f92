use diesel::{
    sql_types::{BigInt, Double, Nullable, Text},
    QueryableByName,
};
use serde::{Deserialize, Serialize};

use super::{double_option, new_id};

#[derive(Debug, Clone, PartialEq, QueryableByName, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[diesel(sql_type = Text)]
    pub country_id: String,
    #[diesel(sql_type = Text)]
    pub country_code: String,
    #[diesel(sql_type = Text)]
    pub country_code3: String,
    #[diesel(sql_type = Text)]
    pub country_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub capital: Option<String>,
    #[diesel(sql_type = Text)]
    pub continent_code: String,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub area: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub population: Option<i64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub latitude: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub longitude: Option<f64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub currency_code: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub currency_name: Option<String>,
    #[diesel(sql_type = Text)]
    pub languages: String,
}

/// A country to insert. Import files and `POST /country` bodies use this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCountry {
    #[serde(default = "new_id")]
    pub country_id: String,
    pub country_code: String,
    pub country_code3: String,
    pub country_name: String,
    #[serde(default)]
    pub capital: Option<String>,
    pub continent_code: String,
    #[serde(default)]
    pub area: Option<i64>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub currency_name: Option<String>,
    pub languages: String,
}

/// A partial update. Missing fields are left alone; an explicit `null`
/// clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub capital: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub population: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency_code: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
}

impl CountryFilters {
    pub fn by_country_code(code: impl Into<String>) -> Self {
        Self {
            country_code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn by_continent_code(code: impl Into<String>) -> Self {
        Self {
            continent_code: Some(code.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::record::Record;
    use crate::value::SqlValue;

    #[test]
    fn test_new_country_generates_id() {
        let country: NewCountry = serde_json::from_value(json!({
            "countryCode": "PT",
            "countryCode3": "PRT",
            "countryName": "Portugal",
            "continentCode": "EU",
            "languages": "pt-PT,mwl"
        }))
        .unwrap();

        assert_eq!(country.country_id.len(), 36);
        assert_eq!(country.capital, None);
    }

    #[test]
    fn test_update_keeps_explicit_nulls() {
        let update: CountryUpdate = serde_json::from_value(json!({
            "capital": null,
            "population": 10_300_000
        }))
        .unwrap();

        assert_eq!(update.capital, Some(None));
        assert_eq!(update.population, Some(Some(10_300_000)));
        assert_eq!(update.area, None);

        let record = Record::from_serialize(&update).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("capital"), Some(&SqlValue::Null));
        assert_eq!(record.get("population"), Some(&SqlValue::Integer(10_300_000)));
    }

    #[test]
    fn test_filters_only_carry_set_fields() {
        let record = Record::from_serialize(&CountryFilters::by_continent_code("EU")).unwrap();
        let columns: Vec<_> = record.columns().collect();
        assert_eq!(columns, vec!["continent_code"]);
    }
}
