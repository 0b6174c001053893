//! Commodity installment orders: models and service

pub mod model;
pub mod service;

pub use model::{CommodityOrder, CreateOrderRequest, ListOrdersQuery, OrderStatus};
pub use service::CommodityService;
