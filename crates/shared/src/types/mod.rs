//! Common types used across the application.

pub mod calendar;
pub mod id;
pub mod money;

pub use calendar::{add_months, challenge_year_bounds, cutover_date, days_between};
pub use id::*;
pub use money::{round_money, validate_amount, AmountError};
