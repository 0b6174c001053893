//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::commodity::CommodityService;
use crate::eligibility::EligibilityService;
use crate::guarantor::GuarantorService;
use crate::loan::LoanService;
use crate::schedule::ScheduleService;

use axum::extract::FromRef;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub loan_service: Arc<LoanService>,
    pub guarantor_service: Arc<GuarantorService>,
    pub schedule_service: Arc<ScheduleService>,
    pub commodity_service: Arc<CommodityService>,
    pub eligibility_service: Arc<EligibilityService>,
}

impl AppState {
    pub fn new(
        db_pool: PgPool,
        loan_service: Arc<LoanService>,
        guarantor_service: Arc<GuarantorService>,
        schedule_service: Arc<ScheduleService>,
        commodity_service: Arc<CommodityService>,
        eligibility_service: Arc<EligibilityService>,
    ) -> Self {
        Self {
            db_pool,
            loan_service,
            guarantor_service,
            schedule_service,
            commodity_service,
            eligibility_service,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for Arc<LoanService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.loan_service.clone()
    }
}

impl FromRef<AppState> for Arc<GuarantorService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.guarantor_service.clone()
    }
}

impl FromRef<AppState> for Arc<ScheduleService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.schedule_service.clone()
    }
}

impl FromRef<AppState> for Arc<CommodityService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.commodity_service.clone()
    }
}

impl FromRef<AppState> for Arc<EligibilityService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.eligibility_service.clone()
    }
}
