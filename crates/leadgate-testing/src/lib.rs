//! Test harness for leadgate integration tests.
//!
//! Provides a mock lead API (wiremock), a recording sheet sink, and a
//! pipeline builder wired to both, so tests exercise the real relay
//! logic without any network dependency.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use leadgate_delivery::{
    DeliveryError, DeliveryPipeline, RelaySeeds, Result, SheetSink, TrackdriveClient,
    TrackdriveConfig,
};
use serde_json::Value;
use tokio::sync::Mutex;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

/// Lead token used by every test pipeline.
pub const TEST_LEAD_TOKEN: &str = "74aae788dcb64a4c8c5328176bb6403a";
/// Origin URL used by every test pipeline.
pub const TEST_ORIGIN_URL: &str = "https://forms.example.com/";
/// Sheet tab used by every test pipeline.
pub const TEST_SHEET_TITLE: &str = "rideshare";

/// Sheet sink that records rows in memory instead of talking to Google.
#[derive(Default)]
pub struct RecordingSheets {
    /// Number of `ensure_sheet_and_headers` invocations.
    pub ensure_calls: AtomicUsize,
    /// Appended rows, in arrival order.
    pub rows: Mutex<Vec<Vec<String>>>,
    /// When set, `ensure_sheet_and_headers` fails.
    pub fail_ensure: AtomicBool,
    /// When set, `append_row` fails.
    pub fail_append: AtomicBool,
}

#[async_trait]
impl SheetSink for RecordingSheets {
    async fn ensure_sheet_and_headers(&self, _title: &str, _columns: &[&str]) -> Result<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_ensure.load(Ordering::SeqCst) {
            return Err(DeliveryError::sheets("setup failed"));
        }
        Ok(())
    }

    async fn append_row(&self, _title: &str, row: &[String]) -> Result<()> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(DeliveryError::sheets("append failed"));
        }
        self.rows.lock().await.push(row.to_vec());
        Ok(())
    }
}

/// Test environment with a mock lead API and a recording sheet sink.
pub struct TestEnv {
    /// The mock TrackDrive server.
    pub trackdrive: MockServer,
    /// The recording sheet sink shared with pipelines built from this env.
    pub sheets: Arc<RecordingSheets>,
}

impl TestEnv {
    /// Creates a new test environment and starts the mock lead API.
    pub async fn new() -> Self {
        init_test_tracing();

        Self { trackdrive: MockServer::start().await, sheets: Arc::new(RecordingSheets::default()) }
    }

    /// Builds a pipeline pointed at the mock lead API.
    pub fn pipeline(&self) -> DeliveryPipeline {
        self.pipeline_with_api_url(self.trackdrive.uri())
    }

    /// Builds a pipeline pointed at an arbitrary lead API URL, for
    /// unreachable-upstream scenarios.
    pub fn pipeline_with_api_url(&self, api_url: String) -> DeliveryPipeline {
        let trackdrive = TrackdriveClient::new(TrackdriveConfig {
            api_url,
            api_key: "test-api-key".to_string(),
            ..TrackdriveConfig::default()
        })
        .expect("test client config is valid");

        DeliveryPipeline::new(trackdrive, self.sheets.clone(), RelaySeeds {
            lead_token: TEST_LEAD_TOKEN.to_string(),
            origin_url: TEST_ORIGIN_URL.to_string(),
            sheet_title: TEST_SHEET_TITLE.to_string(),
        })
    }

    /// Mounts a mock response accepting every lead with the given body.
    pub async fn lead_api_accepts(&self, body: Value) {
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.trackdrive)
            .await;
    }

    /// Mounts a mock response rejecting every lead.
    pub async fn lead_api_rejects(&self, status: u16, body: Value) {
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.trackdrive)
            .await;
    }
}

fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
