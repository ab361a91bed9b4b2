//! HTTP implementation of the document API.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::api::DocumentApi;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::types::{EntityTypeDef, Entry, EntryCollection, EntryQuery, Locale};

/// Header naming the entity type when creating an entry.
const ENTITY_TYPE_HEADER: &str = "X-Entity-Type";

/// Header carrying the document version for optimistic updates.
const VERSION_HEADER: &str = "X-Version";

/// A [`DocumentApi`] implementation over HTTP.
///
/// All endpoints live under `/spaces/{space}/environments/{environment}`
/// and are bearer-authenticated with the configured token.
pub struct HttpDocumentClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpDocumentClient {
    /// Build a client from a configuration.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        if config.space_id.is_empty() {
            return Err(Error::Config("space id must not be empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Transport)?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.scope_url(), path)
    }

    async fn check(&self, response: Response, what: &str) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(what.to_string()));
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[async_trait]
impl DocumentApi for HttpDocumentClient {
    async fn entries(&self, query: &EntryQuery) -> Result<EntryCollection, Error> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(entity_type) = &query.entity_type {
            params.push(("entity_type", entity_type.clone()));
        }
        if let Some(entity_id) = &query.entity_id {
            params.push(("fields.entityId", entity_id.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let response = self
            .http
            .get(self.url("/entries"))
            .bearer_auth(&self.config.access_token)
            .query(&params)
            .send()
            .await?;
        let response = self.check(response, "entries").await?;
        Ok(response.json::<EntryCollection>().await?)
    }

    async fn create_entry_with_id(
        &self,
        entity_type: &str,
        entry_id: &str,
        fields: Map<String, Value>,
    ) -> Result<Entry, Error> {
        debug!(entity_type, entry_id, "creating entry");
        let response = self
            .http
            .put(self.url(&format!("/entries/{entry_id}")))
            .bearer_auth(&self.config.access_token)
            .header(ENTITY_TYPE_HEADER, entity_type)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        let response = self.check(response, entry_id).await?;
        Ok(response.json::<Entry>().await?)
    }

    async fn update_entry(&self, entry: &Entry) -> Result<Entry, Error> {
        debug!(entry_id = %entry.sys.id, version = entry.sys.version, "updating entry");
        let response = self
            .http
            .put(self.url(&format!("/entries/{}", entry.sys.id)))
            .bearer_auth(&self.config.access_token)
            .header(VERSION_HEADER, entry.sys.version)
            .json(&json!({ "fields": entry.fields }))
            .send()
            .await?;
        let response = self.check(response, &entry.sys.id).await?;
        Ok(response.json::<Entry>().await?)
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<(), Error> {
        debug!(entry_id, "deleting entry");
        let response = self
            .http
            .delete(self.url(&format!("/entries/{entry_id}")))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        self.check(response, entry_id).await?;
        Ok(())
    }

    async fn locales(&self) -> Result<Vec<Locale>, Error> {
        let response = self
            .http
            .get(self.url("/locales"))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        let response = self.check(response, "locales").await?;
        let envelope = response.json::<ItemsEnvelope<Locale>>().await?;
        Ok(envelope.items)
    }

    async fn entity_type(&self, id: &str) -> Result<Option<EntityTypeDef>, Error> {
        let response = self
            .http
            .get(self.url(&format!("/entity_types/{id}")))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        match self.check(response, id).await {
            Ok(response) => Ok(Some(response.json::<EntityTypeDef>().await?)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_entity_type(&self, def: &EntityTypeDef) -> Result<EntityTypeDef, Error> {
        debug!(entity_type = %def.id, "creating entity type");
        let response = self
            .http
            .put(self.url(&format!("/entity_types/{}", def.id)))
            .bearer_auth(&self.config.access_token)
            .json(def)
            .send()
            .await?;
        let response = self.check(response, &def.id).await?;
        Ok(response.json::<EntityTypeDef>().await?)
    }

    async fn update_entity_type(&self, def: &EntityTypeDef) -> Result<EntityTypeDef, Error> {
        debug!(entity_type = %def.id, version = def.version, "updating entity type");
        let response = self
            .http
            .put(self.url(&format!("/entity_types/{}", def.id)))
            .bearer_auth(&self.config.access_token)
            .header(VERSION_HEADER, def.version)
            .json(def)
            .send()
            .await?;
        let response = self.check(response, &def.id).await?;
        Ok(response.json::<EntityTypeDef>().await?)
    }

    async fn delete_entity_type(&self, id: &str) -> Result<(), Error> {
        debug!(entity_type = %id, "deleting entity type");
        let response = self
            .http
            .delete(self.url(&format!("/entity_types/{id}")))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;
        self.check(response, id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_space() {
        let config = ClientConfig::new("", "master", "tok");
        assert!(matches!(
            HttpDocumentClient::new(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_url_scoping() {
        let config = ClientConfig::new("s1", "staging", "tok");
        let client = HttpDocumentClient::new(config).unwrap();
        assert!(client.url("/entries").ends_with("/spaces/s1/environments/staging/entries"));
    }
}
