use std::{cell::RefCell, fmt, rc::Rc};

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::config::{AmountRange, CodeConfig};

/// Number of digits in a verification code.
pub const VERIFICATION_CODE_LENGTH: usize = 4;

/// Random number source shared by the field generator and the gate.
///
/// Clones share the same underlying generator, so a single seed drives a
/// whole run.
#[derive(Clone)]
pub struct RandomSource {
    rng: Rc<RefCell<StdRng>>,
}

impl RandomSource {
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_os() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Rc::new(RefCell::new(rng)),
        }
    }

    /// `count` independent uniform decimal digits.
    pub fn digits(&self, count: usize) -> String {
        let mut rng = self.rng.borrow_mut();
        (0..count)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect()
    }

    /// Uniform draw from `[0, 1)`.
    pub fn unit(&self) -> f64 {
        self.rng.borrow_mut().random::<f64>()
    }

    /// Uniform draw from the closed range `[min, max]`.
    pub fn inclusive(&self, min: u64, max: u64) -> u64 {
        self.rng.borrow_mut().random_range(min..=max)
    }
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RandomSource")
    }
}

/// Digit string made of the configured prefix followed by random digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode(String);

impl GeneratedCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four random decimal digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(pub u64);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Produces the primitive random fields of a record.
#[derive(Debug, Clone)]
pub struct RandomFieldGenerator {
    source: RandomSource,
}

impl RandomFieldGenerator {
    pub fn new(source: RandomSource) -> Self {
        Self { source }
    }

    /// Prefix followed by `total_length - prefix.len()` random digits.
    ///
    /// The configuration must have been validated.
    pub fn generate_code(&self, config: &CodeConfig) -> GeneratedCode {
        let random_len = config.total_length.saturating_sub(config.prefix.len());
        let mut code = String::with_capacity(config.total_length);
        code.push_str(&config.prefix);
        code.push_str(&self.source.digits(random_len));
        GeneratedCode(code)
    }

    pub fn generate_verification_code(&self) -> VerificationCode {
        VerificationCode(self.source.digits(VERIFICATION_CODE_LENGTH))
    }

    /// Uniform amount within `range`; `range.min <= range.max` is required.
    pub fn generate_amount(&self, range: &AmountRange) -> Amount {
        Amount(self.source.inclusive(range.min, range.max))
    }
}
