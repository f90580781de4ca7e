//! Stylus contract hosting the quorum batch executor.
//!
//! Members sign a digest of an action list off-chain; anyone holding a quorum of those
//! signatures submits them through `execute`, and the contract runs the list as itself.

#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]
#![cfg_attr(not(any(test, feature = "export-abi")), no_std)]

extern crate alloc;

pub mod errors;
pub mod executor;
pub mod host;
pub mod storage;


pub use executor::QuorumExecutor;
