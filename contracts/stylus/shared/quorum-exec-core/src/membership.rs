//! Authorised signer set and signature threshold.

use alloc::collections::BTreeSet;

use alloy_primitives::Address;

use crate::errors::{AuthFault, ConfigError, ExecError};

pub trait Membership {
    fn is_member(&self, who: Address) -> bool;

    fn quorum(&self) -> usize;
}

/// In-memory membership, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumPolicy {
    members: BTreeSet<Address>,
    quorum: usize,
}

impl QuorumPolicy {
    pub fn new(
        members: impl IntoIterator<Item = Address>,
        quorum: usize,
    ) -> Result<Self, ConfigError> {
        let mut set = BTreeSet::new();
        for member in members {
            if member == Address::ZERO {
                return Err(ConfigError::ZeroMember);
            }
            if !set.insert(member) {
                return Err(ConfigError::DuplicateMember(member));
            }
        }
        check_threshold(set.len(), quorum)?;
        Ok(Self { members: set, quorum })
    }

    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Membership for QuorumPolicy {
    fn is_member(&self, who: Address) -> bool {
        self.members.contains(&who)
    }

    fn quorum(&self) -> usize {
        self.quorum
    }
}

/// `0 < quorum <= members`, membership non-empty.
pub fn check_threshold(members: usize, quorum: usize) -> Result<(), ConfigError> {
    if members == 0 {
        return Err(ConfigError::EmptyMembership);
    }
    if quorum == 0 || quorum > members {
        return Err(ConfigError::QuorumOutOfRange { quorum, members });
    }
    Ok(())
}

/// Validate a signer list against the membership before anything is digested.
///
/// A single pass over adjacent pairs rejects both unsorted and duplicate signers.
pub fn check_signers<M: Membership + ?Sized>(
    membership: &M,
    signers: &[Address],
    signature_count: usize,
) -> Result<(), ExecError> {
    let quorum = membership.quorum();
    if signature_count < quorum {
        return Err(ExecError::InsufficientAuthorization {
            provided: signature_count,
            required: quorum,
            fault: AuthFault::BelowQuorum,
        });
    }
    if signature_count != signers.len() {
        return Err(ExecError::InsufficientAuthorization {
            provided: signature_count,
            required: signers.len(),
            fault: AuthFault::CountMismatch,
        });
    }

    let mut previous: Option<Address> = None;
    for (index, signer) in signers.iter().enumerate() {
        if let Some(prev) = previous {
            if *signer <= prev {
                return Err(ExecError::InsufficientAuthorization {
                    provided: index,
                    required: signers.len(),
                    fault: AuthFault::UnsortedSigners,
                });
            }
        }
        if !membership.is_member(*signer) {
            return Err(ExecError::InsufficientAuthorization {
                provided: index,
                required: signers.len(),
                fault: AuthFault::NotMember,
            });
        }
        previous = Some(*signer);
    }
    Ok(())
}
