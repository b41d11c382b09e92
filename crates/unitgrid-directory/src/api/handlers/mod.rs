//! API request handlers

pub mod enroll;

pub use enroll::{enroll_unit, AppState, EnrollRequest, EnrollResponse};
