//! Fixed-term investments and simple-interest accrual.
//!
//! An investment is committed for a term of whole months at an annual
//! simple-interest rate. Its lifecycle is `Fixed` -> `Matured` (terminal);
//! the transition posts exactly one interest ledger entry, guarded by an
//! idempotency key in the persistence layer.
//!
//! Two interest figures are deliberately kept apart:
//! - the *accrued estimate* (`interest_accrued`): a display-only linear
//!   figure that is never written to the ledger
//! - the *posted interest* (`total_interest_expected`): the single amount
//!   realized into the ledger at maturity

pub mod accrual;
pub mod error;
pub mod types;

pub use accrual::MaturityCheck;
pub use error::InvestmentError;
pub use types::{validate_terms, Investment, InvestmentStatus};
