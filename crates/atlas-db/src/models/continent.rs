use diesel::{sql_types::Text, QueryableByName};
use serde::{Deserialize, Serialize};

use super::new_id;

#[derive(Debug, Clone, PartialEq, Eq, QueryableByName, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Continent {
    #[diesel(sql_type = Text)]
    pub continent_id: String,
    #[diesel(sql_type = Text)]
    pub continent_code: String,
    #[diesel(sql_type = Text)]
    pub continent_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContinent {
    #[serde(default = "new_id")]
    pub continent_id: String,
    pub continent_code: String,
    pub continent_name: String,
}

impl NewContinent {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            continent_id: new_id(),
            continent_code: code.into(),
            continent_name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_name: Option<String>,
}
