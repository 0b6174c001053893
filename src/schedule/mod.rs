//! Installment schedule engine: models, pure engine, persistence service

pub mod engine;
pub mod model;
pub mod service;

pub use model::{
    InstallmentEntry, InstallmentStatus, LedgerEntry, PlanKind, RecordPaymentRequest,
    ScheduleStatistics,
};
pub use service::ScheduleService;
