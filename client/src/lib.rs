use std::path::Path;

use comfy_table::{presets::UTF8_HORIZONTAL_ONLY, Attribute, Cell, ContentArrangement, Table};
use kernel::{ErrorResponse, InspectionResult, Provenance, SyncAck, SyncRequest};
use reqwest::{Client, Response};
use resource::Endpoint;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

pub mod resource;

const PHOTOS_FIELD: &str = "photos";

pub struct InspectParams {
    pub uri: String,
    pub files: Vec<String>,
}

pub struct SyncParams {
    pub uri: String,
    pub node_id: String,
    pub weights: Vec<f64>,
}

pub async fn inspect_photos(params: InspectParams) {
    let Some(endpoint) = endpoint(&params.uri) else {
        return;
    };

    let mut form = reqwest::multipart::Form::new();
    for file in &params.files {
        match photo_part(file).await {
            Ok(part) => form = form.part(PHOTOS_FIELD, part),
            Err(e) => {
                println!("cannot read {file}: {e}");
                return;
            }
        }
    }

    let client = Client::new();
    match client.post(endpoint.inspect()).multipart(form).send().await {
        Ok(response) => {
            if let Some(result) = decode::<InspectionResult>(response).await {
                print_inspection(&endpoint, &result);
            }
        }
        Err(e) => println!("error: {e}"),
    }
}

pub async fn verify_batch(uri: &str, batch_id: &str) {
    let Some(endpoint) = endpoint(uri) else {
        return;
    };

    let client = Client::new();
    match client.get(endpoint.verify(batch_id)).send().await {
        Ok(response) => {
            if let Some(provenance) = decode::<Provenance>(response).await {
                print_provenance(&provenance);
            }
        }
        Err(e) => println!("error: {e}"),
    }
}

pub async fn push_update(params: SyncParams) {
    let Some(endpoint) = endpoint(&params.uri) else {
        return;
    };

    let update = SyncRequest {
        node_id: params.node_id,
        weights: params.weights,
    };
    let client = Client::new();
    match client
        .post(endpoint.federated_sync())
        .json(&update)
        .send()
        .await
    {
        Ok(response) => {
            if let Some(ack) = decode::<SyncAck>(response).await {
                println!(
                    "update from {} {}. Global model version: {}",
                    update.node_id, ack.status, ack.global_version
                );
            }
        }
        Err(e) => println!("error: {e}"),
    }
}

fn endpoint(uri: &str) -> Option<Endpoint> {
    let endpoint = Endpoint::new(uri);
    if endpoint.is_none() {
        println!("invalid server URI: {uri}");
    }
    endpoint
}

async fn photo_part(file: &str) -> std::io::Result<reqwest::multipart::Part> {
    let file_name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let f = File::open(file).await?;
    let meta = f.metadata().await?;
    let stream = reqwest::Body::wrap_stream(ReaderStream::new(f));
    Ok(reqwest::multipart::Part::stream_with_length(stream, meta.len()).file_name(file_name))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Option<T> {
    let status = response.status();
    if status.is_success() {
        match response.json::<T>().await {
            Ok(r) => Some(r),
            Err(e) => {
                println!("JSON decode error: {e}");
                None
            }
        }
    } else {
        match response.json::<ErrorResponse>().await {
            Ok(e) => println!("request failed ({status}) {}: {}", e.code, e.error),
            Err(_) => println!("request failed ({status})"),
        }
        None
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120)
        .set_header(
            header
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn print_inspection(endpoint: &Endpoint, result: &InspectionResult) {
    let mut photos = new_table(vec!["Photo", "Stored as", "Size", "Type"]);
    for p in &result.photos {
        photos.add_row(vec![
            Cell::new(&p.original_name),
            Cell::new(endpoint.download(&p.url)),
            Cell::new(p.size),
            Cell::new(&p.content_type),
        ]);
    }
    println!("{photos}");

    let mut report = new_table(vec!["Check", "Result"]);
    report
        .add_row(vec![
            Cell::new("Verdict"),
            Cell::new(format!(
                "{} ({:.1}%)",
                result.verdict.status,
                result.verdict.confidence * 100.0
            )),
        ])
        .add_row(vec![
            Cell::new("Deficiency"),
            Cell::new(format!(
                "{} {}. {}",
                result.nutritional_deficiency.kind,
                result.nutritional_deficiency.severity,
                result.nutritional_deficiency.advice
            )),
        ])
        .add_row(vec![
            Cell::new("Ripeness"),
            Cell::new(format!(
                "{}: {}",
                result.zero_waste.ripeness, result.zero_waste.recipe
            )),
        ])
        .add_row(vec![
            Cell::new("Allergy risk"),
            Cell::new(format!(
                "{} {}. {}",
                result.allergy_scan.risk, result.allergy_scan.pesticide, result.allergy_scan.warning
            )),
        ])
        .add_row(vec![
            Cell::new("CO2"),
            Cell::new(format!(
                "{} (saves {} vs import)",
                result.carbon_tracker.co2_impact, result.carbon_tracker.saving_vs_import
            )),
        ])
        .add_row(vec![
            Cell::new("Batch"),
            Cell::new(format!(
                "{} from {}",
                result.blockchain.batch_id, result.blockchain.farm
            )),
        ]);
    println!("{report}");
}

fn print_provenance(provenance: &Provenance) {
    let mut table = new_table(vec!["Step", "Event"]);
    for (i, step) in provenance.journey.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(step)]);
    }
    println!(
        "batch {} verified: {} organic: {}",
        provenance.batch_id, provenance.verified, provenance.is_organic
    );
    println!("{table}");
}
