//! schemashift client - typed async client for the content management API.
//!
//! This crate provides the remote-document operations schemashift needs:
//! entries, entity-type definitions, locales, and the app-token exchange.
//! All calls are scoped by a (space, environment) pair.
//!
//! # Quick Start
//!
//! ```ignore
//! use schemashift_client::{ClientConfig, HttpDocumentClient, DocumentApi, EntryQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("my-space", "master", "my-token");
//!     let client = HttpDocumentClient::new(config)?;
//!
//!     // Find the default locale for the environment
//!     let locales = client.locales().await?;
//!
//!     // Fetch migration-state entries
//!     let query = EntryQuery::of_type("migration").with_limit(1000);
//!     let entries = client.entries(&query).await?;
//!
//!     println!("{} of {} entries", entries.items.len(), entries.total);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use api::DocumentApi;
pub use auth::{exchange_app_token, AppTokenRequest};
pub use client::HttpDocumentClient;
pub use config::ClientConfig;
pub use error::Error;
pub use types::{
    EntityFieldDef, EntityTypeDef, Entry, EntryCollection, EntryQuery, FieldKind, Locale, Sys,
};
