//! HTTP API endpoints for the Pirate Ledger
//!
//! Thin JSON wrappers over `ProfileService`; all rules live in the ledger.

pub mod ledger;

pub use ledger::{api_error, create_router, ErrorResponse, LedgerApiState};
