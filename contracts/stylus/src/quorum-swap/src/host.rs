use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use quorum_exec_core::{ActionKind, CallError, Environment, TokenHost};
use quorum_exec_stylus::raw_call;

sol! {
    interface IERC20 {
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }
}

/// Moves tokens with this contract as the `transferFrom` spender.
pub struct TokenCaller {
    now: u64,
}

impl TokenCaller {
    pub fn new(now: u64) -> Self {
        Self { now }
    }
}

impl Environment for TokenCaller {
    type Checkpoint = ();

    fn block_timestamp(&self) -> u64 {
        self.now
    }

    // A failed swap reverts the transaction.
    fn checkpoint(&mut self) -> Self::Checkpoint {}

    fn revert_to(&mut self, _checkpoint: Self::Checkpoint) {}
}

impl TokenHost for TokenCaller {
    fn transfer_from(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CallError> {
        let data = IERC20::transferFromCall { from, to, amount }.abi_encode();
        let out = raw_call(ActionKind::ValueCall, token, U256::ZERO, &data)?;
        // Tokens that return nothing are accepted; an explicit `false` is a failure.
        if out.len() >= 32 && out[..32].iter().all(|b| *b == 0) {
            return Err(CallError::Reverted);
        }
        Ok(())
    }
}
