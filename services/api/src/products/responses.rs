use serde::Serialize;
use shopsync_db::products::models::Product;

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
    pub count: usize,
}
