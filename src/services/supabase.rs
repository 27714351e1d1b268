use crate::models::{
    CreateDecisionRequest, CreateIntroductionRequest, CreatePersonRequest, Decision, Introduction,
    Person, UpdateIntroductionRequest, UpdatePersonRequest,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const PEOPLE: &str = "people";
const MATCH_DECISIONS: &str = "match_decisions";
const INTRODUCTIONS: &str = "introductions";

/// Errors that can occur when interacting with the hosted database
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: token rejected")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Row filter in the REST query dialect
///
/// Only equality and membership are needed by the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, String),
    Neq(&'static str, String),
    In(&'static str, Vec<String>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Filter::Eq(column, value.to_string())
    }

    /// Membership in `values`
    pub fn any_of<T: ToString>(column: &'static str, values: &[T]) -> Self {
        Filter::In(column, values.iter().map(ToString::to_string).collect())
    }

    pub fn neq(column: &'static str, value: impl ToString) -> Self {
        Filter::Neq(column, value.to_string())
    }

    /// `column` and operator expression, e.g. `("id", "eq.42")`
    fn parts(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.to_string(), format!("eq.{}", value)),
            Filter::Neq(column, value) => (column.to_string(), format!("neq.{}", value)),
            Filter::In(column, values) => (column.to_string(), format!("in.({})", values.join(","))),
            Filter::Or(inner) => {
                let joined = inner
                    .iter()
                    .map(|f| {
                        let (column, expr) = f.parts();
                        format!("{}.{}", column, expr)
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                ("or".to_string(), format!("({})", joined))
            }
        }
    }

    /// Encoded `key=value` query pair
    pub fn to_query_pair(&self) -> String {
        let (key, expr) = self.parts();
        format!("{}={}", urlencoding::encode(&key), urlencoding::encode(&expr))
    }
}

#[derive(Debug, Deserialize)]
struct AuthUserResponse {
    id: Uuid,
}

/// Row written when a person is created
#[derive(Serialize)]
struct NewPerson<'a> {
    matchmaker_id: Uuid,
    #[serde(flatten)]
    person: &'a CreatePersonRequest,
}

#[derive(Serialize)]
struct NewDecision<'a> {
    matchmaker_id: Uuid,
    #[serde(flatten)]
    decision: &'a CreateDecisionRequest,
}

#[derive(Serialize)]
struct NewIntroduction<'a> {
    matchmaker_id: Uuid,
    #[serde(flatten)]
    introduction: &'a CreateIntroductionRequest,
}

/// Hosted database client
///
/// Handles all communication with the backend including:
/// - People, decisions and introductions tables
/// - Resolving bearer tokens to users
///
/// Authenticates with the service role key; tenant scoping is applied by
/// the callers through explicit `matchmaker_id` filters.
pub struct SupabaseClient {
    base_url: String,
    service_role_key: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(base_url: String, service_role_key: String) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str, filters: &[Filter]) -> String {
        let mut url = format!("{}/rest/v1/{}?select=*", self.base_url, table);
        for filter in filters {
            url.push('&');
            url.push_str(&filter.to_query_pair());
        }
        url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SupabaseError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let json: Value = response.json().await?;
        serde_json::from_value(json)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse rows: {}", e)))
    }

    /// Fetch every row matching all `filters`
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, filters);
        tracing::debug!("Selecting from {} with {} filters", table, filters.len());
        self.send(self.authorized(self.client.get(&url))).await
    }

    /// Fetch at most one row matching all `filters`
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<T>, SupabaseError> {
        let mut rows: Vec<T> = self.select(table, filters).await?;
        if rows.len() > 1 {
            return Err(SupabaseError::InvalidResponse(format!(
                "Expected at most one row from {}, got {}",
                table,
                rows.len()
            )));
        }
        Ok(rows.pop())
    }

    /// Insert a row and return it as stored
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, SupabaseError> {
        let url = format!("{}/rest/v1/{}?select=*", self.base_url, table);
        let builder = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(body);

        let mut rows: Vec<T> = self.send(builder).await?;
        rows.pop()
            .ok_or_else(|| SupabaseError::InvalidResponse(format!("Insert into {} returned no row", table)))
    }

    /// Patch every row matching `filters`, returning the first updated row if any
    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        body: &B,
    ) -> Result<Option<T>, SupabaseError> {
        let url = self.table_url(table, filters);
        let builder = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=representation")
            .json(body);

        let mut rows: Vec<T> = self.send(builder).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }

    // People

    pub async fn create_person(
        &self,
        matchmaker_id: Uuid,
        person: &CreatePersonRequest,
    ) -> Result<Person, SupabaseError> {
        self.insert(PEOPLE, &NewPerson { matchmaker_id, person }).await
    }

    pub async fn list_people(&self, matchmaker_id: Uuid) -> Result<Vec<Person>, SupabaseError> {
        self.select(PEOPLE, &[Filter::eq("matchmaker_id", matchmaker_id)]).await
    }

    /// Fetch a person only if it belongs to `matchmaker_id`
    pub async fn get_person(
        &self,
        person_id: Uuid,
        matchmaker_id: Uuid,
    ) -> Result<Option<Person>, SupabaseError> {
        self.select_one(
            PEOPLE,
            &[Filter::eq("id", person_id), Filter::eq("matchmaker_id", matchmaker_id)],
        )
        .await
    }

    /// Whether `matchmaker_id` owns at least one of `person_ids`, in a single query
    pub async fn owns_any_person(
        &self,
        person_ids: &[Uuid],
        matchmaker_id: Uuid,
    ) -> Result<bool, SupabaseError> {
        if person_ids.is_empty() {
            return Ok(false);
        }
        let owned: Vec<Person> = self
            .select(
                PEOPLE,
                &[Filter::any_of("id", person_ids), Filter::eq("matchmaker_id", matchmaker_id)],
            )
            .await?;
        Ok(!owned.is_empty())
    }

    pub async fn update_person(
        &self,
        person_id: Uuid,
        matchmaker_id: Uuid,
        changes: &UpdatePersonRequest,
    ) -> Result<Option<Person>, SupabaseError> {
        self.update(
            PEOPLE,
            &[Filter::eq("id", person_id), Filter::eq("matchmaker_id", matchmaker_id)],
            changes,
        )
        .await
    }

    /// Soft delete
    pub async fn deactivate_person(
        &self,
        person_id: Uuid,
        matchmaker_id: Uuid,
    ) -> Result<Option<Person>, SupabaseError> {
        let changes = UpdatePersonRequest {
            active: Some(false),
            ..Default::default()
        };
        self.update_person(person_id, matchmaker_id, &changes).await
    }

    /// Every active person except `person_id`, across all matchmakers
    pub async fn list_match_pool(&self, person_id: Uuid) -> Result<Vec<Person>, SupabaseError> {
        self.select(PEOPLE, &[Filter::eq("active", true), Filter::neq("id", person_id)])
            .await
    }

    // Decisions

    pub async fn create_decision(
        &self,
        matchmaker_id: Uuid,
        decision: &CreateDecisionRequest,
    ) -> Result<Decision, SupabaseError> {
        self.insert(MATCH_DECISIONS, &NewDecision { matchmaker_id, decision }).await
    }

    pub async fn list_decisions(
        &self,
        person_id: Uuid,
        matchmaker_id: Uuid,
    ) -> Result<Vec<Decision>, SupabaseError> {
        self.select(
            MATCH_DECISIONS,
            &[Filter::eq("person_id", person_id), Filter::eq("matchmaker_id", matchmaker_id)],
        )
        .await
    }

    // Introductions

    pub async fn create_introduction(
        &self,
        matchmaker_id: Uuid,
        introduction: &CreateIntroductionRequest,
    ) -> Result<Introduction, SupabaseError> {
        self.insert(INTRODUCTIONS, &NewIntroduction { matchmaker_id, introduction }).await
    }

    pub async fn list_introductions(&self, matchmaker_id: Uuid) -> Result<Vec<Introduction>, SupabaseError> {
        self.select(INTRODUCTIONS, &[Filter::eq("matchmaker_id", matchmaker_id)]).await
    }

    pub async fn get_introduction(
        &self,
        introduction_id: Uuid,
        matchmaker_id: Uuid,
    ) -> Result<Option<Introduction>, SupabaseError> {
        self.select_one(
            INTRODUCTIONS,
            &[Filter::eq("id", introduction_id), Filter::eq("matchmaker_id", matchmaker_id)],
        )
        .await
    }

    pub async fn update_introduction(
        &self,
        introduction_id: Uuid,
        matchmaker_id: Uuid,
        changes: &UpdateIntroductionRequest,
    ) -> Result<Option<Introduction>, SupabaseError> {
        self.update(
            INTRODUCTIONS,
            &[Filter::eq("id", introduction_id), Filter::eq("matchmaker_id", matchmaker_id)],
            changes,
        )
        .await
    }

    /// Introductions involving `person_id` in either slot, by any matchmaker
    pub async fn list_introductions_for_person(
        &self,
        person_id: Uuid,
    ) -> Result<Vec<Introduction>, SupabaseError> {
        self.select(
            INTRODUCTIONS,
            &[Filter::Or(vec![
                Filter::eq("person_a_id", person_id),
                Filter::eq("person_b_id", person_id),
            ])],
        )
        .await
    }

    // Auth

    /// Resolve a user access token to the user id
    pub async fn get_user(&self, access_token: &str) -> Result<Uuid, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user: AuthUserResponse = response.json().await?;
                Ok(user.id)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SupabaseError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SupabaseError::Api {
                    status: status.as_u16(),
                    message: error_message(status, &body),
                })
            }
        }
    }

    /// Health check for the REST endpoint
    pub async fn health_check(&self) -> Result<bool, SupabaseError> {
        let url = format!("{}/rest/v1/", self.base_url);
        let response = self.authorized(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

/// Pull the `message` field out of an error body, falling back to the status text
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client = SupabaseClient::new("https://db.test/".to_string(), "key".to_string()).unwrap();

        assert_eq!(client.base_url(), "https://db.test");
        assert_eq!(client.service_role_key, "key");
    }

    #[test]
    fn test_equality_filters() {
        assert_eq!(Filter::eq("active", true).to_query_pair(), "active=eq.true");
        assert_eq!(Filter::neq("id", "abc").to_query_pair(), "id=neq.abc");
    }

    #[test]
    fn test_membership_filter_is_encoded() {
        let filter = Filter::any_of("id", &["a", "b"]);
        assert_eq!(filter.to_query_pair(), "id=in.%28a%2Cb%29");
    }

    #[test]
    fn test_or_filter() {
        let filter = Filter::Or(vec![Filter::eq("person_a_id", "x"), Filter::eq("person_b_id", "x")]);
        assert_eq!(
            filter.to_query_pair(),
            "or=%28person_a_id.eq.x%2Cperson_b_id.eq.x%29"
        );
    }

    #[test]
    fn test_table_url() {
        let client = SupabaseClient::new("https://db.test".to_string(), "key".to_string()).unwrap();
        let url = client.table_url(PEOPLE, &[Filter::eq("matchmaker_id", "m1")]);

        assert_eq!(url, "https://db.test/rest/v1/people?select=*&matchmaker_id=eq.m1");
    }

    #[test]
    fn test_error_message_prefers_body() {
        let message = error_message(StatusCode::BAD_REQUEST, r#"{"message":"Database error"}"#);
        assert_eq!(message, "Database error");

        let fallback = error_message(StatusCode::BAD_GATEWAY, "<html>");
        assert_eq!(fallback, "Bad Gateway");
    }
}
