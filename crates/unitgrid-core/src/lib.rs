//! # Unitgrid Core
//!
//! Core types and credential primitives for the unitgrid directory, the
//! service through which networked nodes ("units") enroll their identity
//! and public key and receive a bearer token.
//!
//! ## Key Concepts
//!
//! - **Unit**: a registered node, keyed by its unique identity
//! - **Enrollment claim**: identity + public key + observed network origin
//! - **Token**: bearer credential bound to a unit, rotated on every enrollment

pub mod crypto;
pub mod error;
pub mod token;
pub mod types;

pub use crypto::UnitPublicKey;
pub use error::{CoreError, Result};
pub use token::{JwtIssuer, TokenClaims, TokenError, TokenIssuer};
pub use types::{EnrollmentClaim, Unit};
