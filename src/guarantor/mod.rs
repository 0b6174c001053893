//! Guarantor approval workflow: models and service

pub mod model;
pub mod service;

pub use model::{
    ApprovalStatus, ApprovalView, FanOutOutcome, GuarantorApproval, GuarantorDecision,
    RespondRequest, APPROVAL_WINDOW_HOURS,
};
pub use service::GuarantorService;
