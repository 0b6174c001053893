//! Route definitions for the API

mod commodity;
mod eligibility;
mod guarantor;
mod loan;

pub use commodity::order_routes;
pub use eligibility::eligibility_routes;
pub use guarantor::guarantor_routes;
pub use loan::loan_routes;
