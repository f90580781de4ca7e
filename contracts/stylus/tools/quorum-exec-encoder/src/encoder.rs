//! ABI calldata for the executor and swap contracts, plus the ERC-20 payloads actions carry.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use quorum_exec_core::{AuthorizationRequest, Signature, SwapTerms};

sol! {
    /// External surface of the `quorum-executor` contract.
    interface IQuorumExecutor {
        struct ActionData {
            uint8 kind;
            address target;
            uint256 value;
            bytes payload;
        }

        function execute(ActionData[] actions, address[] signers, uint64 deadline, bytes[] signatures) external payable;
        function nonceOf(address signer) external view returns (uint256);
        function domainSeparator() external view returns (bytes32);
        function requestDigest(ActionData[] actions, address[] signers, uint256[] nonces, uint64 deadline) external view returns (bytes32);
    }

    /// External surface of the `quorum-swap` contract.
    interface IQuorumSwap {
        function swap(
            address ownerA,
            address ownerB,
            address tokenA,
            address tokenB,
            uint256 valueA,
            uint256 valueB,
            uint64 deadline,
            bytes sigA,
            bytes sigB
        ) external;
        function nonceOf(address owner) external view returns (uint256);
    }

    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
    }
}

fn action_data(request: &AuthorizationRequest) -> Vec<IQuorumExecutor::ActionData> {
    request
        .actions
        .iter()
        .map(|action| IQuorumExecutor::ActionData {
            kind: action.kind as u8,
            target: action.target,
            value: action.value,
            payload: Bytes::from(action.payload.clone()),
        })
        .collect()
}

/// Calldata for `execute`, submitted by any relayer once every signature is collected.
pub fn encode_execute_calldata(request: &AuthorizationRequest, signatures: &[Signature]) -> Vec<u8> {
    IQuorumExecutor::executeCall {
        actions: action_data(request),
        signers: request.signers.clone(),
        deadline: request.deadline,
        signatures: signatures.iter().cloned().map(Bytes::from).collect(),
    }
    .abi_encode()
}

pub fn encode_swap_calldata(terms: &SwapTerms, signature_a: &Signature, signature_b: &Signature) -> Vec<u8> {
    IQuorumSwap::swapCall {
        ownerA: terms.owner_a,
        ownerB: terms.owner_b,
        tokenA: terms.token_a,
        tokenB: terms.token_b,
        valueA: terms.value_a,
        valueB: terms.value_b,
        deadline: terms.deadline,
        sigA: Bytes::from(signature_a.clone()),
        sigB: Bytes::from(signature_b.clone()),
    }
    .abi_encode()
}

/// `transfer(to, amount)` payload for a ValueCall against an ERC-20 target.
pub fn erc20_transfer(to: Address, amount: U256) -> Vec<u8> {
    IERC20::transferCall { to, amount }.abi_encode()
}

pub fn erc20_balance_of(owner: Address) -> Vec<u8> {
    IERC20::balanceOfCall { owner }.abi_encode()
}
