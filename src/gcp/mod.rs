//! GCP API interaction module
//!
//! Thin REST bindings for the handful of Google Cloud APIs the monitor needs.
//!
//! # Module Structure
//!
//! - [`auth`] - Credential resolution (ADC or a supplied access token)
//! - [`client`] - Main GCP client and per-service URL builders
//! - [`http`] - HTTP utilities and API error classification
//! - [`fetch`] - Auto-paginating list calls and resource-name helpers
//! - [`hierarchy`] - Folder/project listing and the hierarchy walk
//! - [`assets`] - Cloud Asset Inventory search for service attachments
//! - [`compute`] - Service attachment and subnetwork detail lookups
//!
//! # Example
//!
//! ```ignore
//! use psc_subnet_monitor::gcp::{auth::GcpCredentials, client::{ApiEndpoints, GcpClient}};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let credentials = GcpCredentials::application_default().await?;
//!     let client = GcpClient::new(credentials, ApiEndpoints::default())?;
//!     let walk = psc_subnet_monitor::gcp::hierarchy::walk_folders(&client, &["123".into()]).await;
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod auth;
pub mod client;
pub mod compute;
pub mod fetch;
pub mod hierarchy;
pub mod http;
