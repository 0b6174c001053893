//! Loan lifecycle: models and service

pub mod model;
pub mod service;

pub use model::{
    transition_allowed, DecisionRequest, ListLoansQuery, Loan, LoanProduct, LoanStatus,
    LoanWithTerms, ReasonRequest, SubmitLoanRequest, SubmitLoanResponse,
};
pub use service::LoanService;
