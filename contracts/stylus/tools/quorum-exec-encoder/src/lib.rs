//! Off-chain companion to the quorum execution contracts.
//!
//! Signers use this crate to rebuild the exact digests the contracts recover against, relayers
//! use it to encode calldata, and tests use [`sim::SimChain`] as an in-memory host for the engine.

pub mod encoder;
pub mod signer;
pub mod sim;
pub mod types;
