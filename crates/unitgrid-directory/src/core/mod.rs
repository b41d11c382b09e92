//! Core enrollment logic for the directory

mod enrollment;
mod validation;

pub use enrollment::{Enrolled, Enrollment, EnrollmentError};
pub use validation::{KeyBinding, ValidationError, ValidationPolicy, MAX_IDENTITY_LEN};
