//! Campus Market library.
//!
//! A peer-to-peer marketplace for students: listings, a session cart,
//! checkout into per-seller orders, an order status lifecycle, discount
//! codes and sales, and a question forum. All state lives in a
//! [`store::RecordStore`] as CSV collections.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use session::{CartChange, Session};
pub use state::AppState;
pub use store::{Collection, FileStore, MemoryStore, RecordStore};
