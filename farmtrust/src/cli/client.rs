use client::{InspectParams, SyncParams};

pub async fn inspect(params: InspectParams) {
    client::inspect_photos(params).await;
}

pub async fn verify(uri: &str, batch_id: &str) {
    client::verify_batch(uri, batch_id).await;
}

pub async fn sync(params: SyncParams) {
    client::push_update(params).await;
}
