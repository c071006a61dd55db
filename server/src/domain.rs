use kernel::{InspectionResult, Provenance, StoredFile, SyncAck, SyncRequest};

/// Single file part of an upload batch as received from the client.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl RawUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }
}

/// Stored file content ready to be sent back.
#[derive(Debug)]
pub struct Asset {
    pub name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

/// Produce analysis backend.
///
/// Only a static implementation exists; handlers depend on this trait so a real
/// classifier, ledger or aggregator can replace it.
pub trait Analyst: Send + Sync {
    fn inspect(&self, photos: Vec<StoredFile>) -> InspectionResult;

    fn verify(&self, batch_id: &str) -> Provenance;

    fn sync(&self, update: &SyncRequest) -> SyncAck;
}
