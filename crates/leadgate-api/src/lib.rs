//! HTTP surface for the leadgate relay.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod server;

use std::sync::Arc;

use leadgate_delivery::{DeliveryPipeline, GoogleSheetsClient, TrackdriveClient};

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded service configuration.
    pub config: Arc<Config>,
    /// The relay pipeline delivering to both sinks.
    pub pipeline: Arc<DeliveryPipeline>,
}

impl AppState {
    /// Wraps an existing configuration and pipeline.
    pub fn new(config: Config, pipeline: Arc<DeliveryPipeline>) -> Self {
        Self { config: Arc::new(config), pipeline }
    }

    /// Builds the production pipeline (TrackDrive client plus Google
    /// Sheets sink) from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when either HTTP client cannot be constructed
    /// from the configured settings.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let trackdrive = TrackdriveClient::new(config.to_trackdrive_config())?;
        let sheets = Arc::new(GoogleSheetsClient::new(config.to_sheets_config())?);
        let pipeline = DeliveryPipeline::new(trackdrive, sheets, config.to_relay_seeds());

        Ok(Self::new(config, Arc::new(pipeline)))
    }
}
