use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use quorum_exec_core::ExecError;
use stylus_sdk::stylus_proc::SolidityError;

sol! {
    error ExpiredRequest(uint64 deadline);
    error SignerMismatch(address recovered, address expected);
    /// `leg` 0 moves tokenA from ownerA, `leg` 1 moves tokenB from ownerB.
    error TransferFailed(uint256 leg);
    error NonceExhausted(address owner);
}

#[derive(SolidityError)]
pub enum SwapError {
    ExpiredRequest(ExpiredRequest),
    SignerMismatch(SignerMismatch),
    TransferFailed(TransferFailed),
    NonceExhausted(NonceExhausted),
}

impl From<ExecError> for SwapError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::ExpiredRequest { deadline } => SwapError::ExpiredRequest(ExpiredRequest { deadline }),
            ExecError::SignerMismatch { recovered, expected } => {
                SwapError::SignerMismatch(SignerMismatch { recovered, expected })
            }
            ExecError::ActionFailure { index, .. } => SwapError::TransferFailed(TransferFailed {
                leg: U256::from(index),
            }),
            ExecError::NonceExhausted { signer } => {
                SwapError::NonceExhausted(NonceExhausted { owner: signer })
            }
            // The swap engine has no membership and never reports this.
            ExecError::InsufficientAuthorization { .. } => SwapError::SignerMismatch(SignerMismatch {
                recovered: Address::ZERO,
                expected: Address::ZERO,
            }),
        }
    }
}
