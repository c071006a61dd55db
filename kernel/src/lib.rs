#![warn(clippy::unwrap_in_result)]
#![warn(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Represents an uploaded photo persisted by the intake service.
///
/// The generated name is unique within the upload directory and is the only
/// name the file is stored and served under. Records are immutable once the
/// file is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredFile {
    /// Unique on-disk file name assigned by the service
    pub generated_name: String,
    /// File name as supplied by the client
    pub original_name: String,
    /// Location of the file on the server's disk
    pub path: String,
    /// Path the file can be downloaded from, e.g. `/uploads/<generated_name>`
    pub url: String,
    /// Size of the file in bytes
    pub size: u64,
    /// MIME type the file was accepted as
    pub content_type: String,
    /// Moment the file was written
    pub created_at: DateTime<Utc>,
}

/// Simulated produce inspection returned for an uploaded batch of photos.
///
/// None of the values are derived from the photo bytes. The shape is fixed so
/// that a real analysis backend can later fill the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InspectionResult {
    pub verdict: Verdict,
    pub nutritional_deficiency: NutritionalDeficiency,
    pub zero_waste: ZeroWaste,
    pub allergy_scan: AllergyScan,
    pub carbon_tracker: CarbonFootprint,
    pub blockchain: BlockchainRecord,
    /// Photos persisted for this inspection
    pub photos: Vec<StoredFile>,
}

/// Organic certification verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Verdict {
    pub status: String,
    /// Classifier confidence in range 0..=1
    pub confidence: f64,
    #[serde(rename = "isOrganic")]
    pub is_organic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NutritionalDeficiency {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ZeroWaste {
    pub ripeness: String,
    pub recipe: String,
    pub nutrient_match: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AllergyScan {
    pub pesticide: String,
    pub risk: String,
    pub warning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CarbonFootprint {
    pub weight: String,
    pub co2_impact: String,
    pub saving_vs_import: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BlockchainRecord {
    pub verified: bool,
    pub batch_id: String,
    pub farm: String,
}

/// Provenance of a produce batch as recorded on the (simulated) ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub batch_id: String,
    pub verified: bool,
    /// Ordered supply chain steps, oldest first
    pub journey: Vec<String>,
    pub is_organic: bool,
}

/// Model update pushed by a farm node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SyncRequest {
    pub node_id: String,
    pub weights: Vec<f64>,
}

/// Aggregator acknowledgement of a model update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncAck {
    pub status: String,
    pub global_version: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable message
    pub error: String,
    /// Machine readable snake_case code
    pub code: String,
}
