//! # Providers
//!
//! Clients for the reservation systems this tool can watch. Each provider
//! translates its own availability payload into the normalized
//! [`availability::AvailableCampsite`] records consumed by the filter.

/// Provider contract and fetch errors
mod provider;
pub use provider::*;

/// Shared HTTP client construction
mod http;

/// recreation.gov client
mod rec_gov;
pub use rec_gov::*;

/// ReserveCalifornia (UseDirect) client
mod reserve_california;
pub use reserve_california::*;
