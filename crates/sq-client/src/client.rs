use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use sq_auth::{AuthConfig, SessionStore};

use crate::errors::{ClientError, Result};
use crate::models::{DqlRequest, SqlRequest};
use crate::validate;

/// Discovery and SQL endpoint paths, resolved against the base URL
pub mod endpoints {
    pub const DISCOVER_NAMESPACE: &str = "discover/namespace";
    pub const DISCOVER_TABLE: &str = "discover/table";
    pub const DISCOVER_TABLE_COLUMN: &str = "discover/table/column";
    pub const DISCOVER_TABLE_INDEX: &str = "discover/table/index";
    pub const DISCOVER_TABLE_PRIMARY_KEY: &str = "discover/table/primaryKey";
    pub const DISCOVER_TABLE_RELATIONS: &str = "discover/table/relations";
    pub const DISCOVER_REFS_PRIMARY_KEY: &str = "discover/refs/primarykey";
    pub const DISCOVER_REFS_FOREIGN_KEY: &str = "discover/refs/foreignkey";
    pub const SQL_DDL: &str = "sql/ddl";
    pub const SQL_DML: &str = "sql/dml";
    pub const SQL_DQL: &str = "sql/dql";
    pub const SQL_VIEWS: &str = "sql/views";
}

/// Header carrying the caller-supplied capability token for SQL calls
const BISCUIT_HEADER: &str = "Biscuit";

/// Client for the platform's discovery and SQL endpoints
///
/// Every call loads the persisted session and presents its access token
/// as a bearer credential; response JSON is returned opaquely. Token
/// lifecycle lives in `sq-auth`: on [`ClientError::Unauthorized`], rotate
/// or re-authenticate there and retry the call.
#[derive(Clone)]
pub struct PlatformClient {
    base_url: Url,
    http: Client,
    store: Arc<dyn SessionStore>,
}

impl PlatformClient {
    /// Create a client sharing the auth component's session store
    pub fn new(config: &AuthConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.http_timeouts.connect)
            .timeout(config.http_timeouts.request)
            .user_agent(config.user_agent.as_deref().unwrap_or("sqlway"))
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
            store,
        })
    }

    async fn access_token(&self) -> Result<String> {
        let session = self.store.load().await?;
        Ok(session.access_token)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let access_token = self.access_token().await?;

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_snippet: String = body.chars().take(200).collect();

            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized { body_snippet });
            }

            return Err(ClientError::Http {
                status,
                body_snippet,
            });
        }

        Ok(response.json().await?)
    }

    async fn post_sql<T: Serialize>(
        &self,
        path: &str,
        request: &T,
        biscuit: Option<&str>,
    ) -> Result<Value> {
        let access_token = self.access_token().await?;

        let mut builder = self
            .http
            .post(self.base_url.join(path)?)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", access_token));

        if let Some(biscuit) = biscuit {
            builder = builder.header(BISCUIT_HEADER, biscuit);
        }

        let response = builder.json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_snippet: String = body.chars().take(200).collect();

            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized { body_snippet });
            }

            return Err(ClientError::Http {
                status,
                body_snippet,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch namespace metadata
    #[instrument(skip(self))]
    pub async fn namespaces(&self) -> Result<Value> {
        let url = self.base_url.join(endpoints::DISCOVER_NAMESPACE)?;

        debug!("Fetching namespace metadata");
        self.get_json(url).await
    }

    /// Fetch table metadata for a namespace, filtered by scope
    /// (`ALL`, `PUBLIC`, `PRIVATE` or `SUBSCRIPTION`)
    #[instrument(skip(self))]
    pub async fn tables(&self, scope: &str, namespace: &str) -> Result<Value> {
        validate::name("scope", scope)?;
        validate::identifier("namespace", namespace)?;

        let mut url = self.base_url.join(endpoints::DISCOVER_TABLE)?;
        url.query_pairs_mut()
            .append_pair("scope", scope)
            .append_pair("namespace", namespace);

        debug!("Fetching table metadata");
        self.get_json(url).await
    }

    /// Fetch column metadata for a table
    #[instrument(skip(self))]
    pub async fn table_columns(&self, namespace: &str, table: &str) -> Result<Value> {
        self.table_detail(endpoints::DISCOVER_TABLE_COLUMN, namespace, table)
            .await
    }

    /// Fetch index metadata for a table
    #[instrument(skip(self))]
    pub async fn table_indexes(&self, namespace: &str, table: &str) -> Result<Value> {
        self.table_detail(endpoints::DISCOVER_TABLE_INDEX, namespace, table)
            .await
    }

    /// Fetch primary key metadata for a table
    #[instrument(skip(self))]
    pub async fn table_primary_keys(&self, namespace: &str, table: &str) -> Result<Value> {
        self.table_detail(endpoints::DISCOVER_TABLE_PRIMARY_KEY, namespace, table)
            .await
    }

    async fn table_detail(&self, path: &str, namespace: &str, table: &str) -> Result<Value> {
        validate::identifier("namespace", namespace)?;
        validate::identifier("table", table)?;

        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .append_pair("namespace", namespace)
            .append_pair("table", table);

        debug!("Fetching table detail metadata");
        self.get_json(url).await
    }

    /// Fetch table relationship metadata for a namespace
    #[instrument(skip(self))]
    pub async fn table_relationships(&self, scope: &str, namespace: &str) -> Result<Value> {
        validate::name("scope", scope)?;
        validate::identifier("namespace", namespace)?;

        let mut url = self.base_url.join(endpoints::DISCOVER_TABLE_RELATIONS)?;
        url.query_pairs_mut()
            .append_pair("namespace", namespace)
            .append_pair("scope", scope);

        debug!("Fetching table relationship metadata");
        self.get_json(url).await
    }

    /// Fetch the primary keys referenced by a foreign key column
    #[instrument(skip(self))]
    pub async fn primary_key_references(
        &self,
        table: &str,
        column: &str,
        namespace: &str,
    ) -> Result<Value> {
        self.reference_detail(endpoints::DISCOVER_REFS_PRIMARY_KEY, table, column, namespace)
            .await
    }

    /// Fetch the foreign keys referencing a primary key column
    #[instrument(skip(self))]
    pub async fn foreign_key_references(
        &self,
        table: &str,
        column: &str,
        namespace: &str,
    ) -> Result<Value> {
        self.reference_detail(endpoints::DISCOVER_REFS_FOREIGN_KEY, table, column, namespace)
            .await
    }

    async fn reference_detail(
        &self,
        path: &str,
        table: &str,
        column: &str,
        namespace: &str,
    ) -> Result<Value> {
        validate::identifier("namespace", namespace)?;
        validate::identifier("table", table)?;
        validate::name("column", column)?;

        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .append_pair("table", table)
            .append_pair("namespace", namespace)
            .append_pair("column", column);

        debug!("Fetching key reference metadata");
        self.get_json(url).await
    }

    /// Create a schema. Carries no resource id and no capability token.
    #[instrument(skip(self))]
    pub async fn create_schema(&self, sql_text: &str) -> Result<Value> {
        validate::sql_text(sql_text)?;

        let request = SqlRequest {
            resource_id: None,
            sql_text: sql_text.to_string(),
        };

        debug!("Submitting schema DDL");
        self.post_sql(endpoints::SQL_DDL, &request, None).await
    }

    /// Create a table, appending the platform's ownership clause that
    /// names the public key allowed to alter it later
    #[instrument(skip(self, public_key_b64, biscuit))]
    pub async fn ddl_create_table(
        &self,
        resource_id: &str,
        sql_text: &str,
        access_type: &str,
        public_key_b64: &str,
        biscuit: &str,
    ) -> Result<Value> {
        validate::identifier("resourceId", resource_id)?;
        validate::sql_text(sql_text)?;
        validate::name("accessType", access_type)?;

        let request = SqlRequest {
            resource_id: Some(resource_id.to_uppercase()),
            sql_text: with_access_clause(sql_text, public_key_b64, access_type),
        };

        debug!("Submitting CREATE TABLE DDL");
        self.post_sql(endpoints::SQL_DDL, &request, Some(biscuit))
            .await
    }

    /// Alter or drop a table
    #[instrument(skip(self, biscuit))]
    pub async fn ddl(&self, resource_id: &str, sql_text: &str, biscuit: &str) -> Result<Value> {
        validate::identifier("resourceId", resource_id)?;
        validate::sql_text(sql_text)?;

        let request = SqlRequest {
            resource_id: Some(resource_id.to_uppercase()),
            sql_text: sql_text.to_string(),
        };

        debug!("Submitting DDL");
        self.post_sql(endpoints::SQL_DDL, &request, Some(biscuit))
            .await
    }

    /// Insert, update, merge or delete rows
    #[instrument(skip(self, biscuit))]
    pub async fn dml(&self, resource_id: &str, sql_text: &str, biscuit: &str) -> Result<Value> {
        validate::identifier("resourceId", resource_id)?;
        validate::sql_text(sql_text)?;

        let request = SqlRequest {
            resource_id: Some(resource_id.to_uppercase()),
            sql_text: sql_text.to_string(),
        };

        debug!("Submitting DML");
        self.post_sql(endpoints::SQL_DML, &request, Some(biscuit))
            .await
    }

    /// Run a selection. A `row_count` of `None` or zero fetches everything.
    #[instrument(skip(self, biscuit))]
    pub async fn dql(
        &self,
        resource_id: &str,
        sql_text: &str,
        biscuit: &str,
        row_count: Option<u32>,
    ) -> Result<Value> {
        validate::identifier("resourceId", resource_id)?;
        validate::sql_text(sql_text)?;

        let request = DqlRequest {
            resource_id: resource_id.to_uppercase(),
            sql_text: sql_text.to_string(),
            row_count: row_count.filter(|&count| count > 0),
        };

        debug!("Submitting DQL");
        self.post_sql(endpoints::SQL_DQL, &request, Some(biscuit))
            .await
    }

    /// Execute a named view with its query parameters
    #[instrument(skip(self))]
    pub async fn execute_view(&self, view_name: &str, params: &[(&str, &str)]) -> Result<Value> {
        validate::name("viewName", view_name)?;

        let mut url = self
            .base_url
            .join(&format!("{}/{}", endpoints::SQL_VIEWS, view_name))?;

        // The platform takes all view parameters inside one `params` value
        if !params.is_empty() {
            let param_string = params
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("&");
            url.query_pairs_mut().append_pair("params", &param_string);
        }

        debug!("Executing view");
        self.get_json(url).await
    }
}

/// Append the platform's ownership clause to a CREATE TABLE statement
fn with_access_clause(sql_text: &str, public_key_b64: &str, access_type: &str) -> String {
    format!(
        "{} WITH \"public_key={},access_type={}\"",
        sql_text, public_key_b64, access_type
    )
}
