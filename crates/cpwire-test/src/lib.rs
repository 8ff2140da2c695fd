//! Shared test fixtures for cpwire crates.
//!
//! - [`nqueens`] - N-Queens as an integer model
//! - [`jobshop`] - a small job-shop model built from interval variables
//! - [`scenarios`] - tiny models pinning down encoding behavior
//! - [`messages`] - solver protocol lines for scripted solvers
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! cpwire-test = { workspace = true }
//! ```

pub mod jobshop;
pub mod messages;
pub mod nqueens;
pub mod scenarios;

pub use jobshop::{job_shop, JobShop};
pub use nqueens::{nqueens, NQueens};
pub use scenarios::{infeasible_square, shared_expression, SharedExpression};
