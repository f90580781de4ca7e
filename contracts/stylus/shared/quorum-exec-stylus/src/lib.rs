//! Pieces both Stylus contracts run the engine through.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod calls;
pub mod crypto;
pub mod nonces;


pub use calls::{cache_policy, raw_call, CachePolicy};
pub use crypto::PrecompileRecovery;
pub use nonces::StorageNonces;
