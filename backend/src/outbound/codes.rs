//! Random code generation backed by `rand`.

use rand::Rng;

use crate::domain::ports::CodeGenerator;
use crate::domain::{BookingCode, CODE_ALPHABET, CODE_SUFFIX_LEN, RegistrationCode};

/// Draws code suffixes uniformly from `A-Z0-9` using the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    fn suffix() -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_SUFFIX_LEN)
            .map(|_| {
                let index = rng.gen_range(0..CODE_ALPHABET.len());
                CODE_ALPHABET.get(index).map_or('0', |b| char::from(*b))
            })
            .collect()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn registration_code(&self) -> RegistrationCode {
        loop {
            if let Ok(code) = RegistrationCode::from_suffix(&Self::suffix()) {
                return code;
            }
        }
    }

    fn booking_code(&self) -> BookingCode {
        loop {
            if let Ok(code) = BookingCode::from_suffix(&Self::suffix()) {
                return code;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn codes_carry_their_prefix() {
        let generator = RandomCodeGenerator;
        assert!(generator.registration_code().as_str().starts_with("GH"));
        assert!(generator.booking_code().as_str().starts_with("BK"));
    }

    #[rstest]
    fn suffixes_use_the_code_alphabet() {
        for _ in 0..50 {
            let suffix = RandomCodeGenerator::suffix();
            assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
            assert!(suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[rstest]
    fn codes_vary_between_calls() {
        let generator = RandomCodeGenerator;
        let codes: HashSet<String> = (0..20)
            .map(|_| generator.booking_code().as_str().to_owned())
            .collect();
        assert!(codes.len() > 1);
    }
}
