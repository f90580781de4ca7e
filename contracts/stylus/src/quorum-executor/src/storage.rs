//! Contract storage seen through the engine's membership trait.

use alloy_primitives::Address;
use quorum_exec_core::Membership;
use stylus_sdk::storage::{StorageBool, StorageMap};

pub struct StorageMembers<'a> {
    members: &'a StorageMap<Address, StorageBool>,
    quorum: usize,
}

impl<'a> StorageMembers<'a> {
    pub fn new(members: &'a StorageMap<Address, StorageBool>, quorum: usize) -> Self {
        Self { members, quorum }
    }
}

impl Membership for StorageMembers<'_> {
    fn is_member(&self, who: Address) -> bool {
        self.members.get(who)
    }

    fn quorum(&self) -> usize {
        self.quorum
    }
}
