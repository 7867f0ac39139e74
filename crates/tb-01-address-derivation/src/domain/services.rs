//! # Domain Services
//!
//! Pure CREATE2 derivations for gateway-deployed contracts.
//!
//! ```text
//! address = keccak256(0xff ‖ gateway ‖ salt ‖ keccak256(init_code))[12..]
//! token:  salt = keccak256(symbol)
//!         init_code = token_bytecode ‖ abi(name, symbol, decimals, capacity)
//! burner: salt = keccak256(recipient)
//!         init_code = burner_bytecode ‖ abi(token_address, salt)
//! ```

use super::entities::{BurnerInfo, TokenInfo};
use alloy_primitives::{Address as SolAddress, B256, U256 as SolU256};
use alloy_sol_types::{sol_data, SolType, SolValue};
use sha3::{Digest, Keccak256};
use shared_types::{Address, CrossChainAddress, Hash, U256};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Computes a CREATE2 contract address.
///
/// address = keccak256(0xff ++ deployer ++ salt ++ keccak256(init_code))[12..]
pub fn compute_create2_address(deployer: &Address, salt: &Hash, init_code: &[u8]) -> Address {
    let code_hash = keccak256(init_code);

    let mut data = Vec::with_capacity(85);
    data.push(0xff);
    data.extend_from_slice(deployer);
    data.extend_from_slice(salt);
    data.extend_from_slice(&code_hash);

    let hash = keccak256(&data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    addr
}

/// Salt of a token contract.
pub fn token_salt(symbol: &str) -> Hash {
    keccak256(symbol.as_bytes())
}

/// Salt of a burner contract: keccak256 of the recipient's canonical bytes.
pub fn burner_salt(recipient: &CrossChainAddress) -> Hash {
    keccak256(&recipient.to_canonical_bytes())
}

fn sol_uint(value: U256) -> SolU256 {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    SolU256::from_be_bytes(bytes)
}

/// ABI-encoded token constructor arguments `(string, string, uint8, uint256)`.
pub fn token_constructor_args(info: &TokenInfo) -> Vec<u8> {
    <(
        sol_data::String,
        sol_data::String,
        sol_data::Uint<8>,
        sol_data::Uint<256>,
    )>::abi_encode_params(&(
        info.token_name.clone(),
        info.symbol.clone(),
        info.decimals,
        sol_uint(info.capacity),
    ))
}

/// ABI-encoded burner constructor arguments `(address, bytes32)`.
pub fn burner_constructor_args(token_address: Address, salt: Hash) -> Vec<u8> {
    (SolAddress::from(token_address), B256::from(salt)).abi_encode_params()
}

fn init_code(bytecode: &[u8], args: &[u8]) -> Vec<u8> {
    let mut code = Vec::with_capacity(bytecode.len() + args.len());
    code.extend_from_slice(bytecode);
    code.extend_from_slice(args);
    code
}

/// Token contract address for `info`, deployed by `gateway`.
pub fn derive_token_address(gateway: &Address, token_bytecode: &[u8], info: &TokenInfo) -> Address {
    let init_code = init_code(token_bytecode, &token_constructor_args(info));
    compute_create2_address(gateway, &token_salt(&info.symbol), &init_code)
}

/// Burner contract address binding `token_address` to `recipient`.
pub fn derive_burner_address(
    gateway: &Address,
    burner_bytecode: &[u8],
    token_address: Address,
    symbol: &str,
    recipient: &CrossChainAddress,
) -> (Address, BurnerInfo) {
    let salt = burner_salt(recipient);
    let init_code = init_code(burner_bytecode, &burner_constructor_args(token_address, salt));

    let address = compute_create2_address(gateway, &salt, &init_code);
    let info = BurnerInfo {
        token_address,
        symbol: symbol.to_string(),
        salt,
    };
    (address, info)
}
