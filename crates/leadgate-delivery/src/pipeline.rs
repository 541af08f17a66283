//! The relay pipeline: one submission, two sinks, in strict order.
//!
//! The lead API is called first and its failure short-circuits the
//! spreadsheet entirely. Sheet setup (tab plus header row) runs at most
//! once per process; concurrent first requests share a single setup call
//! through a `OnceCell` rather than racing duplicate ones.

use std::sync::Arc;

use leadgate_core::fields::sheet_columns;
use leadgate_core::{build_api_record, build_sheet_row, sanitize, InboundPayload, Seeds};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{error, info, instrument, warn};

use crate::error::DeliveryError;
use crate::sheets::SheetSink;
use crate::trackdrive::{TrackdriveClient, UpstreamResponse};

/// Per-deployment constants seeded into every projection.
#[derive(Debug, Clone)]
pub struct RelaySeeds {
    /// Authentication token identifying this publisher to the lead API.
    pub lead_token: String,
    /// Origin URL reported as the lead source.
    pub origin_url: String,
    /// Spreadsheet tab receiving lead rows.
    pub sheet_title: String,
}

/// Result of relaying one submission.
///
/// Partial failure is a first-class outcome: once the lead API has
/// accepted the submission there is no rollback, so a failed append
/// leaves the lead delivered upstream with the row lost.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Both sinks received the lead.
    Delivered {
        /// The lead API's response.
        upstream: UpstreamResponse,
    },
    /// The lead API accepted the lead but the spreadsheet append failed.
    PartiallyDelivered {
        /// The lead API's response.
        upstream: UpstreamResponse,
        /// What went wrong on the spreadsheet side.
        sheets_error: DeliveryError,
    },
    /// The lead API refused the lead or could not be reached; the
    /// spreadsheet was never touched.
    Rejected {
        /// The upstream failure.
        error: DeliveryError,
    },
}

/// Sequences the two outbound deliveries for each submission.
pub struct DeliveryPipeline {
    trackdrive: TrackdriveClient,
    sheets: Arc<dyn SheetSink>,
    seeds: RelaySeeds,
    sheet_ready: OnceCell<()>,
}

impl DeliveryPipeline {
    /// Creates a pipeline over the given clients.
    pub fn new(trackdrive: TrackdriveClient, sheets: Arc<dyn SheetSink>, seeds: RelaySeeds) -> Self {
        Self { trackdrive, sheets, seeds, sheet_ready: OnceCell::new() }
    }

    /// Relays one raw submission to both sinks.
    #[instrument(name = "lead_relay", skip(self, payload), fields(client_addr = %client_addr))]
    pub async fn relay(&self, payload: &InboundPayload, client_addr: &str) -> RelayOutcome {
        let clean = sanitize(payload);
        let seeds = self.projection_seeds(client_addr);
        let record = build_api_record(&clean, &seeds);

        let upstream = match self.trackdrive.submit_lead(&record).await {
            Ok(upstream) => upstream,
            Err(error) => {
                warn!(error = %error, "Lead rejected before reaching the spreadsheet");
                return RelayOutcome::Rejected { error };
            },
        };

        info!(status = upstream.status, "Lead accepted upstream");

        let row = build_sheet_row(&clean, &seeds);
        if let Err(sheets_error) = self.append_to_sheet(row).await {
            // The upstream submission is not rolled back; this partial
            // state exists only in the logs.
            error!(error = %sheets_error, "Lead delivered upstream but sheet append failed");
            return RelayOutcome::PartiallyDelivered { upstream, sheets_error };
        }

        info!("Row appended successfully");
        RelayOutcome::Delivered { upstream }
    }

    /// Dry run for the inspection endpoint: sanitizes the payload and
    /// builds the API record without touching either sink.
    pub fn preview(
        &self,
        payload: &InboundPayload,
        client_addr: &str,
    ) -> (InboundPayload, Map<String, Value>) {
        let clean = sanitize(payload);
        let record = build_api_record(&clean, &self.projection_seeds(client_addr));
        (clean, record)
    }

    fn projection_seeds<'a>(&'a self, client_addr: &'a str) -> Seeds<'a> {
        Seeds {
            lead_token: &self.seeds.lead_token,
            origin_url: &self.seeds.origin_url,
            client_addr,
        }
    }

    async fn append_to_sheet(&self, row: Vec<String>) -> Result<(), DeliveryError> {
        // Setup is shared by concurrent first callers; a failed attempt
        // is not latched, so the next request retries it.
        self.sheet_ready
            .get_or_try_init(|| async {
                info!(sheet = %self.seeds.sheet_title, "Preparing sheet and header row");
                self.sheets
                    .ensure_sheet_and_headers(&self.seeds.sheet_title, &sheet_columns())
                    .await
            })
            .await?;

        self.sheets.append_row(&self.seeds.sheet_title, &row).await
    }
}
