//! Unit Directory Server
//!
//! The directory lets networked nodes ("units") enroll an identity and a
//! public key and receive a bearer token for later authenticated calls.
//!
//! ## Enrollment
//!
//! 1. **Validate**: the claim is checked before any store access
//! 2. **Resolve**: the unit is found or created, exactly once per identity
//! 3. **Issue**: a fresh token bound to the identity is minted
//! 4. **Persist**: token, address and updated_at are committed together
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check with unit count
//! - `POST /api/v1/unit/enroll` - Enroll a unit and receive a token

pub mod api;
pub mod config;
pub mod core;
pub mod storage;

pub use crate::api::create_router;
pub use crate::api::handlers::AppState;
pub use crate::config::{ConfigError, DirectoryConfig};
pub use crate::core::{Enrolled, Enrollment, EnrollmentError, KeyBinding, ValidationPolicy};
pub use crate::storage::{MemoryStore, Resolved, StorageError, UnitStore};
