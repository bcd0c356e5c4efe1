use serde::Serialize;
use shopsync_db::orders::models::Order;

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub data: Vec<Order>,
    pub count: usize,
}
