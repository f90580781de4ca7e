//! In-memory host for exercising the engine without a chain.
//!
//! Models just enough of the EVM for the engine's needs: native balances, ERC-20 ledgers, the
//! engine's own storage (reachable only through delegated modules) and whole-world checkpoints.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolCall, SolInterface};
use quorum_exec_core::{ActionHost, CallError, Environment, TokenHost};

use crate::encoder::IERC20::{self, IERC20Calls};

/// Code run by a DelegatedCall, against the engine's storage.
pub type DelegateModule = fn(&mut BTreeMap<B256, B256>, &[u8]) -> Result<Vec<u8>, CallError>;

#[derive(Clone, Debug, Default)]
pub struct TokenLedger {
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<(Address, Address), U256>,
}

impl TokenLedger {
    pub fn balance(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), CallError> {
        let from_balance = self.balance(from);
        if from_balance < amount {
            return Err(CallError::InsufficientBalance);
        }
        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balance(to);
        self.balances.insert(to, to_balance + amount);
        Ok(())
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) -> Result<(), CallError> {
        let allowed = self.allowances.get(&(owner, spender)).copied().unwrap_or_default();
        if allowed < amount {
            return Err(CallError::Reverted);
        }
        self.allowances.insert((owner, spender), allowed - amount);
        Ok(())
    }
}

/// Snapshot-able simulated state.
#[derive(Clone, Debug, Default)]
pub struct World {
    native: BTreeMap<Address, U256>,
    tokens: BTreeMap<Address, TokenLedger>,
    engine_storage: BTreeMap<B256, B256>,
}

pub struct SimChain {
    engine: Address,
    now: u64,
    world: World,
    modules: BTreeMap<Address, DelegateModule>,
}

impl SimChain {
    /// `engine` is the identity every action is executed as.
    pub fn new(engine: Address, now: u64) -> Self {
        Self {
            engine,
            now,
            world: World::default(),
            modules: BTreeMap::new(),
        }
    }

    pub fn engine(&self) -> Address {
        self.engine
    }

    pub fn set_time(&mut self, now: u64) {
        self.now = now;
    }

    pub fn deploy_token(&mut self, token: Address) {
        self.world.tokens.entry(token).or_default();
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: U256) {
        let ledger = self.world.tokens.entry(token).or_default();
        let balance = ledger.balance(to);
        ledger.balances.insert(to, balance + amount);
    }

    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.world
            .tokens
            .entry(token)
            .or_default()
            .allowances
            .insert((owner, spender), amount);
    }

    pub fn fund(&mut self, who: Address, amount: U256) {
        let balance = self.native_balance(who);
        self.world.native.insert(who, balance + amount);
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.world
            .tokens
            .get(&token)
            .map(|ledger| ledger.balance(owner))
            .unwrap_or_default()
    }

    pub fn native_balance(&self, who: Address) -> U256 {
        self.world.native.get(&who).copied().unwrap_or_default()
    }

    pub fn register_module(&mut self, target: Address, module: DelegateModule) {
        self.modules.insert(target, module);
    }

    pub fn engine_slot(&self, slot: B256) -> B256 {
        self.world.engine_storage.get(&slot).copied().unwrap_or_default()
    }

    fn move_native(&mut self, to: Address, value: U256) -> Result<(), CallError> {
        if value == U256::ZERO {
            return Ok(());
        }
        let balance = self.native_balance(self.engine);
        if balance < value {
            return Err(CallError::InsufficientBalance);
        }
        self.world.native.insert(self.engine, balance - value);
        let to_balance = self.native_balance(to);
        self.world.native.insert(to, to_balance + value);
        Ok(())
    }

    fn run_token(&mut self, token: Address, payload: &[u8], read_only: bool) -> Result<Vec<u8>, CallError> {
        let caller = self.engine;
        let ledger = self.world.tokens.get_mut(&token).ok_or(CallError::NoCode(token))?;
        let call = IERC20Calls::abi_decode(payload, true).map_err(|_| CallError::Reverted)?;
        match call {
            IERC20Calls::balanceOf(c) => {
                Ok(IERC20::balanceOfCall::abi_encode_returns(&(ledger.balance(c.owner),)))
            }
            _ if read_only => Err(CallError::StaticStateChange),
            IERC20Calls::transfer(c) => {
                ledger.transfer(caller, c.to, c.amount)?;
                Ok(IERC20::transferCall::abi_encode_returns(&(true,)))
            }
            IERC20Calls::transferFrom(c) => {
                ledger.spend_allowance(c.from, caller, c.amount)?;
                ledger.transfer(c.from, c.to, c.amount)?;
                Ok(IERC20::transferFromCall::abi_encode_returns(&(true,)))
            }
            IERC20Calls::approve(c) => {
                ledger.allowances.insert((caller, c.spender), c.amount);
                Ok(IERC20::approveCall::abi_encode_returns(&(true,)))
            }
        }
    }
}

impl Environment for SimChain {
    type Checkpoint = World;

    fn block_timestamp(&self) -> u64 {
        self.now
    }

    fn checkpoint(&mut self) -> Self::Checkpoint {
        self.world.clone()
    }

    fn revert_to(&mut self, checkpoint: Self::Checkpoint) {
        self.world = checkpoint;
    }
}

impl ActionHost for SimChain {
    fn call(&mut self, target: Address, value: U256, payload: &[u8]) -> Result<Vec<u8>, CallError> {
        self.move_native(target, value)?;
        if self.world.tokens.contains_key(&target) {
            return self.run_token(target, payload, false);
        }
        // Plain value transfer to an account without code.
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        Err(CallError::NoCode(target))
    }

    fn delegate_call(&mut self, target: Address, payload: &[u8]) -> Result<Vec<u8>, CallError> {
        let module = *self.modules.get(&target).ok_or(CallError::NoCode(target))?;
        module(&mut self.world.engine_storage, payload)
    }

    fn static_call(&mut self, target: Address, payload: &[u8]) -> Result<Vec<u8>, CallError> {
        if self.world.tokens.contains_key(&target) {
            return self.run_token(target, payload, true);
        }
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        Err(CallError::NoCode(target))
    }
}

impl TokenHost for SimChain {
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CallError> {
        let spender = self.engine;
        let ledger = self.world.tokens.get_mut(&token).ok_or(CallError::NoCode(token))?;
        ledger.spend_allowance(from, spender, amount)?;
        ledger.transfer(from, to, amount)
    }
}
