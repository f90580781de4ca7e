//! Host-agnostic core of the quorum execution engine.
//!
//! The same code digests, validates and executes requests on-chain (Stylus) and off-chain
//! (signer tooling, simulation), so a digest computed by a signer always matches the one the
//! contract recovers against.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod encoder;
pub mod errors;
pub mod executor;
pub mod host;
pub mod membership;
pub mod nonces;
pub mod swap;
pub mod types;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use encoder::Domain;
pub use errors::{AuthFault, CallError, ConfigError, ExecError, RecoverError};
pub use executor::{BatchExecutor, Execution, Stage};
pub use host::{ActionHost, Environment, TokenHost};
pub use membership::{Membership, QuorumPolicy};
pub use nonces::{MemoryNonces, NonceLedger};
pub use swap::SwapEngine;
pub use types::{Action, ActionKind, AuthorizationRequest, Signature, SwapOffer, SwapTerms};
pub use verifier::SignatureVerifier;
