use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::Datelike;
use rand::{CryptoRng, Rng};

/// one letter per calendar month, January first
pub const MONTH_LETTERS: [char; 12] = ['J', 'F', 'M', 'A', 'M', 'J', 'J', 'A', 'S', 'O', 'N', 'D'];
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NUM_RANDOM_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceCodeModel(String);

#[derive(Debug, PartialEq)]
pub enum ReferenceCodeError {
    InvalidLength(usize),
    InvalidMonthLetter(char),
    InvalidSymbol(char),
}

impl ReferenceCodeModel {
    /// The random source must be cryptographically secure, codes are
    /// visible to store admins and serve as informal claim tickets.
    pub fn generate<D, R>(date: &D, rng: &mut R) -> Self
    where
        D: Datelike,
        R: Rng + CryptoRng + ?Sized,
    {
        let month_idx = date.month0() as usize; // always within 0..12
        let mut code = String::with_capacity(1 + NUM_RANDOM_CHARS);
        code.push(MONTH_LETTERS[month_idx]);
        (0..NUM_RANDOM_CHARS)
            .map(|_| {
                let idx = rng.gen_range(0..CODE_ALPHABET.len());
                code.push(CODE_ALPHABET[idx] as char);
            })
            .count();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for ReferenceCodeModel {
    type Error = ReferenceCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let chars = value.chars().collect::<Vec<_>>();
        if chars.len() != 1 + NUM_RANDOM_CHARS {
            return Err(ReferenceCodeError::InvalidLength(chars.len()));
        }
        if !MONTH_LETTERS.contains(&chars[0]) {
            return Err(ReferenceCodeError::InvalidMonthLetter(chars[0]));
        }
        if let Some(c) = chars[1..]
            .iter()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit()))
        {
            return Err(ReferenceCodeError::InvalidSymbol(*c));
        }
        Ok(Self(value.to_string()))
    }
}

impl Display for ReferenceCodeModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
