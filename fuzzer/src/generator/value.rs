//!
//! The ABI-typed value generation.
//!

use rand::Rng;

use super::Generator;

impl Generator {
    ///
    /// Generates a random token of the specified ABI type.
    ///
    /// Scalar values are biased toward boundaries, where arithmetic edge
    /// cases live; dynamic sizes are biased toward small.
    ///
    pub(crate) fn token(&mut self, param: &ethabi::ParamType) -> ethabi::Token {
        match param {
            ethabi::ParamType::Address => ethabi::Token::Address(self.address()),
            ethabi::ParamType::Uint(bits) => ethabi::Token::Uint(self.uint(*bits)),
            ethabi::ParamType::Int(bits) => ethabi::Token::Int(self.int(*bits)),
            ethabi::ParamType::Bool => ethabi::Token::Bool(self.rng.gen_bool(0.5)),
            ethabi::ParamType::Bytes => {
                let length = self.small_length(64);
                ethabi::Token::Bytes(self.byte_vec(length))
            }
            ethabi::ParamType::FixedBytes(length) => {
                ethabi::Token::FixedBytes(self.byte_vec(*length))
            }
            ethabi::ParamType::String => ethabi::Token::String(self.ascii_string()),
            ethabi::ParamType::Array(inner) => {
                let length = self.small_length(8);
                ethabi::Token::Array((0..length).map(|_| self.token(inner)).collect())
            }
            ethabi::ParamType::FixedArray(inner, length) => {
                ethabi::Token::FixedArray((0..*length).map(|_| self.token(inner)).collect())
            }
            ethabi::ParamType::Tuple(kinds) => {
                ethabi::Token::Tuple(kinds.iter().map(|kind| self.token(kind)).collect())
            }
        }
    }

    ///
    /// Generates an unsigned integer of the specified bit width.
    ///
    fn uint(&mut self, bits: usize) -> ethabi::Uint {
        let max = if bits >= 256 {
            ethabi::Uint::MAX
        } else {
            (ethabi::Uint::one() << bits) - 1
        };

        match self.rng.gen_range(0..6_u32) {
            0 => ethabi::Uint::zero(),
            1 => ethabi::Uint::one(),
            2 => max,
            3 => max - 1,
            _ if bits >= 256 => self.word(),
            _ => self.word() % (max + 1),
        }
    }

    ///
    /// Generates a signed integer of the specified bit width, returned as
    /// its 256-bit two's complement word.
    ///
    fn int(&mut self, bits: usize) -> ethabi::Uint {
        let max_positive = (ethabi::Uint::one() << (bits - 1)) - 1;
        let min_magnitude = ethabi::Uint::one() << (bits - 1);

        match self.rng.gen_range(0..6_u32) {
            0 => ethabi::Uint::zero(),
            1 => ethabi::Uint::one(),
            2 => max_positive,
            // `-1`: all ones under two's complement at any width.
            3 => ethabi::Uint::MAX,
            4 => Self::negate(min_magnitude),
            _ => {
                let magnitude = self.word() % (max_positive + 1);
                if self.rng.gen_bool(0.5) || magnitude.is_zero() {
                    magnitude
                } else {
                    Self::negate(magnitude)
                }
            }
        }
    }

    ///
    /// The 256-bit two's complement negation.
    ///
    fn negate(magnitude: ethabi::Uint) -> ethabi::Uint {
        (!magnitude).overflowing_add(ethabi::Uint::one()).0
    }

    ///
    /// Generates an address from the senders, the deployed contracts, zero,
    /// or 20 random bytes.
    ///
    fn address(&mut self) -> ethabi::Address {
        match self.rng.gen_range(0..6_u32) {
            0 | 1 => self.senders[self.rng.gen_range(0..self.senders.len())],
            2 | 3 if !self.contract_addresses.is_empty() => {
                self.contract_addresses[self.rng.gen_range(0..self.contract_addresses.len())]
            }
            4 => ethabi::Address::zero(),
            _ => {
                let mut bytes = [0u8; 20];
                self.rng.fill(&mut bytes[..]);
                ethabi::Address::from_slice(&bytes)
            }
        }
    }

    ///
    /// Generates a full random 256-bit word.
    ///
    fn word(&mut self) -> ethabi::Uint {
        let mut bytes = [0u8; 32];
        self.rng.fill(&mut bytes[..]);
        ethabi::Uint::from_big_endian(&bytes)
    }

    ///
    /// Generates `length` random bytes.
    ///
    fn byte_vec(&mut self, length: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; length];
        self.rng.fill(bytes.as_mut_slice());
        bytes
    }

    ///
    /// Generates a short printable ASCII string.
    ///
    fn ascii_string(&mut self) -> String {
        let length = self.small_length(32);
        (0..length)
            .map(|_| self.rng.gen_range(0x20..0x7f_u8) as char)
            .collect()
    }

    ///
    /// Generates a dynamic length, biased toward empty and single-element.
    ///
    fn small_length(&mut self, max: usize) -> usize {
        match self.rng.gen_range(0..4_u32) {
            0 => 0,
            1 => 1,
            _ => self.rng.gen_range(0..=max),
        }
    }
}

///
/// The zero value of the specified ABI type, used by the shrinker to
/// simplify arguments.
///
pub fn zero_token(param: &ethabi::ParamType) -> ethabi::Token {
    match param {
        ethabi::ParamType::Address => ethabi::Token::Address(ethabi::Address::zero()),
        ethabi::ParamType::Uint(_) => ethabi::Token::Uint(ethabi::Uint::zero()),
        ethabi::ParamType::Int(_) => ethabi::Token::Int(ethabi::Uint::zero()),
        ethabi::ParamType::Bool => ethabi::Token::Bool(false),
        ethabi::ParamType::Bytes => ethabi::Token::Bytes(Vec::new()),
        ethabi::ParamType::FixedBytes(length) => ethabi::Token::FixedBytes(vec![0u8; *length]),
        ethabi::ParamType::String => ethabi::Token::String(String::new()),
        ethabi::ParamType::Array(_) => ethabi::Token::Array(Vec::new()),
        ethabi::ParamType::FixedArray(inner, length) => {
            ethabi::Token::FixedArray((0..*length).map(|_| zero_token(inner)).collect())
        }
        ethabi::ParamType::Tuple(kinds) => {
            ethabi::Token::Tuple(kinds.iter().map(zero_token).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::generator::Generator;
    use crate::utils;

    use super::zero_token;

    fn generator(seed: u64) -> Generator {
        Generator::new(
            seed,
            vec![utils::parse_address("0x10000").expect("Always valid")],
            100,
            0,
            0,
        )
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let types = vec![
            ethabi::ParamType::Uint(256),
            ethabi::ParamType::Int(64),
            ethabi::ParamType::Address,
            ethabi::ParamType::Array(Box::new(ethabi::ParamType::Bool)),
            ethabi::ParamType::String,
        ];

        let mut first = generator(7);
        let mut second = generator(7);
        for kind in types.iter() {
            assert_eq!(first.token(kind), second.token(kind));
        }

        let word = ethabi::ParamType::Uint(256);
        let mut reference = generator(7);
        let mut other = generator(8);
        let streams_equal = (0..16).all(|_| reference.token(&word) == other.token(&word));
        assert!(!streams_equal);
    }

    #[test]
    fn unsigned_values_respect_the_width() {
        let mut generator = generator(1);
        let limit = ethabi::Uint::from(u8::MAX);
        for _ in 0..256 {
            match generator.token(&ethabi::ParamType::Uint(8)) {
                ethabi::Token::Uint(value) => assert!(value <= limit),
                other => panic!("Unexpected token: {other:?}"),
            }
        }
    }

    #[test]
    fn signed_values_are_sign_extended() {
        let mut generator = generator(2);
        let max_positive = ethabi::Uint::from(127_u64);
        let min_word = Generator::negate(ethabi::Uint::from(128_u64));
        for _ in 0..256 {
            match generator.token(&ethabi::ParamType::Int(8)) {
                ethabi::Token::Int(word) => {
                    assert!(word <= max_positive || word >= min_word);
                }
                other => panic!("Unexpected token: {other:?}"),
            }
        }
    }

    #[test]
    fn generated_tokens_encode_against_their_function() {
        let function = ethabi::Function {
            name: "poke".to_owned(),
            inputs: vec![
                ethabi::Param {
                    name: "who".to_owned(),
                    kind: ethabi::ParamType::Address,
                    internal_type: None,
                },
                ethabi::Param {
                    name: "amounts".to_owned(),
                    kind: ethabi::ParamType::Array(Box::new(ethabi::ParamType::Uint(128))),
                    internal_type: None,
                },
            ],
            outputs: Vec::new(),
            constant: None,
            state_mutability: ethabi::StateMutability::NonPayable,
        };

        let mut generator = generator(3);
        for _ in 0..64 {
            let tokens: Vec<ethabi::Token> = function
                .inputs
                .iter()
                .map(|param| generator.token(&param.kind))
                .collect();
            let calldata = function
                .encode_input(tokens.as_slice())
                .expect("Encoding failed");
            assert_eq!(&calldata[..4], function.short_signature().as_slice());
        }
    }

    #[test]
    fn zero_tokens_match_their_shapes() {
        assert_eq!(
            zero_token(&ethabi::ParamType::FixedArray(
                Box::new(ethabi::ParamType::Uint(8)),
                3,
            )),
            ethabi::Token::FixedArray(vec![
                ethabi::Token::Uint(ethabi::Uint::zero());
                3
            ]),
        );
        assert_eq!(
            zero_token(&ethabi::ParamType::Bytes),
            ethabi::Token::Bytes(Vec::new()),
        );
    }
}
