//! API handlers for the cooperative credit backend

pub mod commodity;
pub mod eligibility;
pub mod guarantor;
pub mod loan;
pub mod schedule;

pub use commodity::*;
pub use eligibility::*;
pub use guarantor::*;
pub use loan::*;
pub use schedule::*;
