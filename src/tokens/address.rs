/// Surface-format check for contract addresses
///
/// Two shapes are accepted: base-58 strings of 32 to 44 characters (Solana
/// mints) and 42-character strings starting with `0x` (EVM contracts). No
/// checksum or on-chain check is done; false positives end up as a
/// provider miss.

const BASE58_MIN_LEN: usize = 32;
const BASE58_MAX_LEN: usize = 44;
const EVM_LEN: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Base58,
    Evm,
}

/// Classify `text` as a plausible contract address
pub fn classify(text: &str) -> Option<AddressKind> {
    if text.len() == EVM_LEN && text.starts_with("0x") {
        return Some(AddressKind::Evm);
    }

    if (BASE58_MIN_LEN..=BASE58_MAX_LEN).contains(&text.len())
        && bs58::decode(text).into_vec().is_ok()
    {
        return Some(AddressKind::Base58);
    }

    None
}

pub fn is_contract_address(text: &str) -> bool {
    classify(text).is_some()
}

/// Pull the candidate token out of a chat message (first word, trimmed)
pub fn extract_candidate(message: &str) -> Option<&str> {
    message.split_whitespace().next()
}
