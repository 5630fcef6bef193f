//!
//! Conversions between the ABI types and the REVM primitive types.
//!

///
/// Converts an ABI address into a REVM address.
///
pub fn abi_address_to_revm_address(address: &ethabi::Address) -> revm::primitives::Address {
    revm::primitives::Address::from_slice(address.as_bytes())
}

///
/// Converts a REVM address into an ABI address.
///
pub fn revm_address_to_abi_address(address: &revm::primitives::Address) -> ethabi::Address {
    ethabi::Address::from_slice(address.as_slice())
}

///
/// Converts an ABI 256-bit word into a REVM 256-bit word.
///
pub fn abi_u256_to_revm_u256(value: ethabi::Uint) -> revm::primitives::U256 {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    revm::primitives::U256::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_round_trip() {
        let address = crate::utils::parse_address("0x10000").expect("Always valid");
        let revm_address = abi_address_to_revm_address(&address);
        assert_eq!(revm_address_to_abi_address(&revm_address), address);
    }

    #[test]
    fn words_preserve_byte_order() {
        let value = ethabi::Uint::from(0x0102_0304_u64);
        assert_eq!(
            abi_u256_to_revm_u256(value),
            revm::primitives::U256::from(0x0102_0304_u64),
        );
    }
}
