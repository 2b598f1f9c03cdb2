//! POS Storefront library.
//!
//! Client-side state and workflows for the POS storefront: the cart with
//! piece and carton pricing, its on-device persistence, the logged-in user,
//! checkout assembly and a thin client for the remote catalog and sales API.
//!
//! # Modules
//!
//! - [`cart`] - cart lines, the cart store and its persisted format
//! - [`storage`] - the key-value persistence contract and its backends
//! - [`models`] - catalog documents, past orders and the user record
//! - [`services`] - checkout, re-order and the session store
//! - [`api`] - REST client for the remote API
//! - [`config`] - environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{AppError, Result};
