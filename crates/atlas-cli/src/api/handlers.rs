use atlas_db::{
    heartbeat::{check_heartbeat, HeartbeatResult},
    helpers::to_snake_case,
    models::{Continent, Country, CountryFilters, CountryUpdate, NewCountry},
    repository::{ContinentRepository, CountryRepository, GetParams, Page, SortingParam},
    schema::country,
    DbError,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::{error::ApiError, AppState};

type ApiResult<T> = Result<T, ApiError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Parses the `orderDesc` path segment.
pub fn parse_order_desc(value: &str) -> ApiResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "desc" => Ok(true),
        "false" | "0" | "asc" => Ok(false),
        _ => Err(ApiError::bad_request(format!(
            "Invalid orderDesc: {value}, expected true or false"
        ))),
    }
}

/// Maps a camelCase field name to a fetchable country column.
pub fn parse_order_by(value: &str) -> ApiResult<String> {
    let column = to_snake_case(value);
    if country::COLUMNS.contains(&column.as_str()) {
        Ok(column)
    } else {
        Err(DbError::InvalidColumn(value.to_string()).into())
    }
}

fn parse_number(name: &str, value: &str) -> ApiResult<u64> {
    value
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid {name}: {value}")))
}

pub async fn list_continents(State(state): State<AppState>) -> ApiResult<Json<Vec<Continent>>> {
    let page = Page::new(1, u64::from(state.config.default_page_size()));
    let continents = state
        .with_db(move |conn| ContinentRepository::list(conn, page))
        .await?;
    Ok(Json(continents))
}

pub async fn countries_by_continent(
    State(state): State<AppState>,
    Path(continent_code): Path<String>,
) -> ApiResult<Json<Vec<Country>>> {
    let page = Page::new(1, u64::from(state.config.default_page_size()));
    let code = continent_code.clone();
    let countries = state
        .with_db(move |conn| {
            CountryRepository::list_by_continent(conn, &code, &GetParams::default(), page)
        })
        .await?;

    if countries.is_empty() {
        return Err(ApiError::not_found(format!(
            "countries not found with continentCode: {continent_code}"
        )));
    }
    Ok(Json(countries))
}

pub async fn countries_page(
    State(state): State<AppState>,
    Path((continent_code, page_number, page_size, order_by, order_desc)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
) -> ApiResult<Json<Vec<Country>>> {
    let number = parse_number("pageNumber", &page_number)?;
    let size = state
        .config
        .clamp_page_size(parse_number("pageSize", &page_size)?);
    let column = parse_order_by(&order_by)?;
    let sorting = if parse_order_desc(&order_desc)? {
        SortingParam::desc(column)
    } else {
        SortingParam::asc(column)
    };

    let code = continent_code.clone();
    let countries = state
        .with_db(move |conn| {
            CountryRepository::list_by_continent(
                conn,
                &code,
                &GetParams::sorted_by(vec![sorting]),
                Page::new(number, size),
            )
        })
        .await?;

    if countries.is_empty() {
        return Err(ApiError::not_found(format!(
            "No countries found with continentCode: {continent_code}"
        )));
    }
    Ok(Json(countries))
}

pub async fn country_by_code(
    State(state): State<AppState>,
    Path(country_code): Path<String>,
) -> ApiResult<Json<Country>> {
    let code = country_code.clone();
    state
        .with_db(move |conn| CountryRepository::find_by_code(conn, &code))
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(format!("country not found with countryCode: {country_code}"))
        })
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HeartbeatResult>) {
    let result = state
        .with_db(|conn| Ok(check_heartbeat(conn, None)))
        .await
        .unwrap_or_else(|err| HeartbeatResult {
            is_ok: false,
            error: Some(err.message),
        });

    let status = if result.is_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(result))
}

pub async fn create_country(
    State(state): State<AppState>,
    payload: Result<Json<NewCountry>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let new_country = body(payload)?;
    let created = state
        .with_db(move |conn| CountryRepository::repository().create(conn, &new_country))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_country(
    State(state): State<AppState>,
    Path(country_code): Path<String>,
    payload: Result<Json<CountryUpdate>, JsonRejection>,
) -> ApiResult<Json<Country>> {
    let update = body(payload)?;
    let filters = CountryFilters::by_country_code(country_code);
    let updated = state
        .with_db(move |conn| {
            CountryRepository::repository().update_single_by_criteria(conn, &filters, &update)
        })
        .await?;
    Ok(Json(updated))
}

pub async fn delete_country(
    State(state): State<AppState>,
    Path(country_code): Path<String>,
) -> ApiResult<StatusCode> {
    let filters = CountryFilters::by_country_code(country_code.clone());
    let deleted = state
        .with_db(move |conn| CountryRepository::repository().delete_by_criteria(conn, &filters))
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found(format!(
            "country not found with countryCode: {country_code}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
