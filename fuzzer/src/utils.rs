//!
//! The contract fuzzer utils.
//!

use sha3::Digest;

///
/// Returns a `keccak256` selector of the specified contract method.
///
pub fn selector(signature: &str) -> [u8; 4] {
    let hash_bytes = sha3::Keccak256::digest(signature.as_bytes());
    hash_bytes[0..4].try_into().expect("Always valid")
}

///
/// Returns the `keccak256` digest of the specified data as a hexadecimal string.
///
pub fn keccak256_hex(data: &[u8]) -> String {
    hex::encode(sha3::Keccak256::digest(data))
}

///
/// Overrides the default formatting for `Address`, which replaces the middle with an ellipsis.
///
pub fn address_as_string(value: &ethabi::Address) -> String {
    format!("0x{}", hex::encode(value.as_bytes()))
}

///
/// Parses an address from a hexadecimal string.
///
/// Short values like `0x30000` are accepted and left-padded to 20 bytes,
/// matching the configuration format of the original tool.
///
pub fn parse_address(value: &str) -> anyhow::Result<ethabi::Address> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() || digits.len() > 2 * ethabi::Address::len_bytes() {
        anyhow::bail!("Invalid address `{value}`");
    }

    let padded = format!("{digits:0>40}");
    let bytes = hex::decode(padded.as_str())
        .map_err(|error| anyhow::anyhow!("Invalid address `{value}`: {error}"))?;
    Ok(ethabi::Address::from_slice(bytes.as_slice()))
}

///
/// Compares two 256-bit words as two's complement signed integers.
///
pub fn signed_gt(first: ethabi::Uint, second: ethabi::Uint) -> bool {
    let sign_bit = ethabi::Uint::one() << 255;
    (first ^ sign_bit) > (second ^ sign_bit)
}

///
/// Renders a 256-bit word as a two's complement signed decimal string.
///
pub fn int_as_string(value: ethabi::Uint) -> String {
    if value.bit(255) {
        let (magnitude, _) = (!value).overflowing_add(ethabi::Uint::one());
        format!("-{magnitude}")
    } else {
        value.to_string()
    }
}

///
/// Derives a campaign seed from the system time.
///
pub fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_nanos() as u64)
        .unwrap_or_default()
}
