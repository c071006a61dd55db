//! Static stand-ins for the classifier, provenance ledger and federated aggregator.

use kernel::{
    AllergyScan, BlockchainRecord, CarbonFootprint, InspectionResult, NutritionalDeficiency,
    Provenance, StoredFile, SyncAck, SyncRequest, Verdict, ZeroWaste,
};

use crate::domain::Analyst;

const JOURNEY: [&str; 4] = [
    "Harvested 2026-01-15",
    "Processed 2026-01-16",
    "In Transit",
    "Delivered",
];

/// Answers every request with the same canned data.
#[derive(Debug, Clone)]
pub struct MockAnalyst {
    global_version: String,
}

impl Default for MockAnalyst {
    fn default() -> Self {
        Self {
            global_version: "2.4.1".to_owned(),
        }
    }
}

impl Analyst for MockAnalyst {
    fn inspect(&self, photos: Vec<StoredFile>) -> InspectionResult {
        tracing::info!("Processing {} images for classification...", photos.len());
        InspectionResult {
            verdict: Verdict {
                status: "Certified Organic".to_owned(),
                confidence: 0.984,
                is_organic: true,
            },
            nutritional_deficiency: NutritionalDeficiency {
                kind: "Potassium (K) deficiency".to_owned(),
                severity: "75%".to_owned(),
                advice: "Add organic seaweed extract.".to_owned(),
            },
            zero_waste: ZeroWaste {
                ripeness: "Overripe".to_owned(),
                recipe: "5-min Zero-Waste Smoothie".to_owned(),
                nutrient_match: "92%".to_owned(),
            },
            allergy_scan: AllergyScan {
                pesticide: "Thiabendazole".to_owned(),
                risk: "HIGH".to_owned(),
                warning: "Cross-reactivity for Mold/Latex sensitive users.".to_owned(),
            },
            carbon_tracker: CarbonFootprint {
                weight: "0.3kg".to_owned(),
                co2_impact: "0.3kg".to_owned(),
                saving_vs_import: "1.2kg".to_owned(),
            },
            blockchain: BlockchainRecord {
                verified: true,
                batch_id: "0xabc123...8f2".to_owned(),
                farm: "Farm_TamilNadu_001".to_owned(),
            },
            photos,
        }
    }

    fn verify(&self, batch_id: &str) -> Provenance {
        Provenance {
            batch_id: batch_id.to_owned(),
            verified: true,
            journey: JOURNEY.iter().map(|s| (*s).to_owned()).collect(),
            is_organic: true,
        }
    }

    fn sync(&self, update: &SyncRequest) -> SyncAck {
        tracing::info!(
            "Received federated update from {} with {} weights",
            update.node_id,
            update.weights.len()
        );
        SyncAck {
            status: "Accepted".to_owned(),
            global_version: self.global_version.clone(),
        }
    }
}
