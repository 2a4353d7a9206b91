//! Ready-made Strise queries.
//!
//! Each helper executes its document through the shared client of an
//! [`ApiContext`] and returns the `edges` list of the result. A failed query
//! yields `Ok(None)` (the failure is logged); only a failed bootstrap is an
//! error.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::auth::AuthError;
use crate::context::ApiContext;

/// Wikidata ID the API uses for Norway.
pub const NORWAY_ID: &str = "Q20";

/// Portfolios of the current user with their companies.
pub const PORTFOLIOS: &str = "
query {
  currentUser {
    portfolios {
      edges {
        node {
          id
          name
          companies {
            edges {
              node {
                id
                name(language: NORWEGIAN)
              }
            }
          }
        }
      }
    }
  }
}";

/// Company search. Variables: `searchQuery`.
pub const COMPANIES: &str = "
query companies($searchQuery: String!) {
  companies(q: $searchQuery) {
    edges {
      node {
        id
        name
      }
    }
  }
}";

/// Country search, first 20 matches. Variables: `q`.
pub const COUNTRIES: &str = "
query countries($q: String) {
  countries(q: $q first: 20) {
    edges {
      node {
        id
        name
      }
    }
  }
}";

/// Trending companies in a country over a time window.
/// Variables: `country`, `from`, `to`.
pub const TRENDING_COMPANIES_IN_COUNTRY: &str = "
query trendingCompaniesInCountry($country: ID! $from: ISODateTime! $to: ISODateTime!) {
  trendingCompanies(locations: [$country] from: $from to: $to) {
    edges {
      node {
        id
        name
      }
    }
  }
}";

/// Length of the window [`get_trending_in_country`] looks back over.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// Returns the current user's portfolios.
///
/// # Errors
///
/// Returns [`AuthError`] if the shared client could not be bootstrapped.
pub async fn get_portfolios(context: &ApiContext) -> Result<Option<serde_json::Value>, AuthError> {
    let data = context.execute_query(PORTFOLIOS, None).await?;
    Ok(data.and_then(|data| edges(&data, &["currentUser", "portfolios"])))
}

/// Searches companies by name.
///
/// # Errors
///
/// Returns [`AuthError`] if the shared client could not be bootstrapped.
pub async fn get_companies(
    context: &ApiContext,
    search_query: &str,
) -> Result<Option<serde_json::Value>, AuthError> {
    let variables = serde_json::json!({ "searchQuery": search_query });
    let data = context.execute_query(COMPANIES, Some(variables)).await?;
    Ok(data.and_then(|data| edges(&data, &["companies"])))
}

/// Searches countries by name.
///
/// # Errors
///
/// Returns [`AuthError`] if the shared client could not be bootstrapped.
pub async fn get_countries(
    context: &ApiContext,
    search_query: &str,
) -> Result<Option<serde_json::Value>, AuthError> {
    let variables = serde_json::json!({ "q": search_query });
    let data = context.execute_query(COUNTRIES, Some(variables)).await?;
    Ok(data.and_then(|data| edges(&data, &["countries"])))
}

/// Returns companies trending in `country_id` over the last week.
///
/// # Errors
///
/// Returns [`AuthError`] if the shared client could not be bootstrapped.
pub async fn get_trending_in_country(
    context: &ApiContext,
    country_id: &str,
) -> Result<Option<serde_json::Value>, AuthError> {
    let variables = trending_variables(country_id, Utc::now());
    let data = context
        .execute_query(TRENDING_COMPANIES_IN_COUNTRY, Some(variables))
        .await?;
    Ok(data.and_then(|data| edges(&data, &["trendingCompanies"])))
}

/// Builds the variables for [`TRENDING_COMPANIES_IN_COUNTRY`] with a window
/// ending at `now`.
#[must_use]
pub fn trending_variables(country_id: &str, now: DateTime<Utc>) -> serde_json::Value {
    let from = now - Duration::days(TRENDING_WINDOW_DAYS);
    serde_json::json!({
        "country": country_id,
        "from": from.to_rfc3339_opts(SecondsFormat::Millis, true),
        "to": now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

fn edges(data: &serde_json::Value, path: &[&str]) -> Option<serde_json::Value> {
    path.iter()
        .try_fold(data, |value, key| value.get(key))
        .and_then(|connection| connection.get("edges"))
        .cloned()
}
