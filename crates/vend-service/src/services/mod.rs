//! Marketplace service implementations.
//!
//! Each service holds the shared [`AppState`](crate::AppState). Public methods
//! take the caller's raw credential and return an
//! [`Envelope`](crate::Envelope); the fallible work lives in private `try_*`
//! methods returning [`ServiceResult`](crate::ServiceResult).

pub mod account_service;
pub mod product_service;
pub mod purchase_service;
pub mod session_service;
