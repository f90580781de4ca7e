//! Stylus contract settling two-party ERC-20 swaps.
//!
//! Both owners sign the same offer; the contract pulls each leg with `transferFrom`, so each owner
//! must have approved this contract for at least their side of the swap.

#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]
#![cfg_attr(not(any(test, feature = "export-abi")), no_std)]

extern crate alloc;

pub mod errors;
pub mod host;
pub mod swap;


pub use swap::QuorumSwap;
