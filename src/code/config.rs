use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::BatchError;

/// Closed range `[min, max]` the amount is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: u64,
    pub max: u64,
}

impl AmountRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Textual layout of an assembled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// Bank label, code, verification code and amount, one per line.
    #[default]
    Full,
    /// The code alone on a single line.
    CodeOnly,
}

/// What happens to an iteration index after the gate rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Move on to the next index; the rejected one yields no record.
    #[default]
    Advance,
    /// Re-run the gate for the same index, at most `max_attempts` times in total.
    Retry { max_attempts: u32 },
}

/// Runtime configuration of a code batch.
///
/// ```
/// # use code_batch::code::config::{CodeConfig, Preset};
/// let config = CodeConfig::from(Preset::Gated);
/// assert_eq!(config.prefix, "1");
/// assert_eq!(config.total_length, 12);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeConfig {
    pub bank_label: String,
    pub currency: String,
    pub prefix: String,
    pub total_length: usize,
    pub amount_range: AmountRange,
    /// Success probability of the authentication, amount-validation and
    /// security-code stages. `None` disables the gate.
    #[serde(default)]
    pub gate_stages: Option<[f64; 3]>,
    #[serde(default)]
    pub layout: RecordLayout,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl CodeConfig {
    /// Loads a JSON configuration file and validates it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BatchError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|error| {
            BatchError::Configuration(format!("{}: {}", path.display(), error))
        })?;

        let config: CodeConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|error| BatchError::Configuration(error.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BatchError> {
        if !self.prefix.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid(format!(
                "prefix must only contain decimal digits, got {:?}",
                self.prefix
            )));
        }

        if self.total_length < self.prefix.len() {
            return Err(invalid(format!(
                "total length {} is shorter than prefix {:?}",
                self.total_length, self.prefix
            )));
        }

        if self.amount_range.min > self.amount_range.max {
            return Err(invalid(format!(
                "amount range is empty: min {} > max {}",
                self.amount_range.min, self.amount_range.max
            )));
        }

        if let Some(stages) = &self.gate_stages {
            if let Some(p) = stages
                .iter()
                .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
            {
                return Err(invalid(format!(
                    "stage success probability must be within [0, 1], got {}",
                    p
                )));
            }
        }

        if let RetryPolicy::Retry { max_attempts: 0 } = self.retry {
            return Err(invalid("retry policy needs at least one attempt".to_string()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> BatchError {
    BatchError::Configuration(message)
}

/// The three known script variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 12-digit codes behind the three-stage gate.
    Gated,
    /// 19-digit codes, larger amounts, no gate.
    Extended,
    /// 12-digit codes written alone, no gate.
    Minimal,
}

impl From<Preset> for CodeConfig {
    fn from(preset: Preset) -> Self {
        let base = CodeConfig {
            bank_label: "Demo Bank".to_string(),
            currency: "MXN".to_string(),
            prefix: "1".to_string(),
            total_length: 12,
            amount_range: AmountRange::new(10, 300),
            gate_stages: None,
            layout: RecordLayout::Full,
            retry: RetryPolicy::Advance,
        };

        match preset {
            Preset::Gated => CodeConfig {
                gate_stages: Some([0.98, 0.95, 0.99]),
                ..base
            },
            Preset::Extended => CodeConfig {
                prefix: "112".to_string(),
                total_length: 19,
                amount_range: AmountRange::new(100, 10_000),
                ..base
            },
            Preset::Minimal => CodeConfig {
                amount_range: AmountRange::new(1, 10_000),
                layout: RecordLayout::CodeOnly,
                ..base
            },
        }
    }
}

impl FromStr for Preset {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gated" => Ok(Preset::Gated),
            "extended" => Ok(Preset::Extended),
            "minimal" => Ok(Preset::Minimal),
            other => Err(invalid(format!(
                "unknown preset {:?} (expected gated, extended or minimal)",
                other
            ))),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Gated => "gated",
            Preset::Extended => "extended",
            Preset::Minimal => "minimal",
        };
        f.write_str(name)
    }
}
