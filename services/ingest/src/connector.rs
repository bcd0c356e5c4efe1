use async_trait::async_trait;

#[derive(Debug)]
pub struct SyncOutcome {
    pub sync_type: String,
    pub upserted: usize,
    pub skipped: usize,
    pub full_sync: bool,
}

#[async_trait]
pub trait Connector: Send + Sync {
    #[allow(dead_code)]
    fn sync_type(&self) -> &str;
    async fn sync(&self) -> Result<SyncOutcome, Box<dyn std::error::Error + Send + Sync>>;
}
