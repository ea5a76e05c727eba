use std::fmt;

use serde::Serialize;

use super::{
    config::{CodeConfig, RecordLayout},
    generator::{Amount, GeneratedCode, VerificationCode},
};

/// One assembled withdrawal-code entry.
///
/// `Display` renders the text block written to the output file, without the
/// trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Record {
    Full {
        bank_label: String,
        code: String,
        verification: String,
        amount: u64,
        currency: String,
    },
    CodeOnly {
        code: String,
    },
}

impl Record {
    pub fn code(&self) -> &str {
        match self {
            Record::Full { code, .. } | Record::CodeOnly { code } => code,
        }
    }

    /// Number of lines the record spans in the output file.
    pub fn line_count(&self) -> usize {
        match self {
            Record::Full { .. } => 4,
            Record::CodeOnly { .. } => 1,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Full {
                bank_label,
                code,
                verification,
                amount,
                currency,
            } => write!(
                f,
                "Bank: {}\nWithdrawal code: {}\nVerification code: {}\nAvailable amount: ${} {}",
                bank_label, code, verification, amount, currency
            ),
            Record::CodeOnly { code } => f.write_str(code),
        }
    }
}

/// Formats generated fields into a [`Record`] according to the layout.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    bank_label: String,
    currency: String,
    layout: RecordLayout,
}

impl RecordAssembler {
    pub fn new(config: &CodeConfig) -> Self {
        Self {
            bank_label: config.bank_label.clone(),
            currency: config.currency.clone(),
            layout: config.layout,
        }
    }

    pub fn assemble(
        &self,
        code: GeneratedCode,
        verification: VerificationCode,
        amount: Amount,
    ) -> Record {
        match self.layout {
            RecordLayout::Full => Record::Full {
                bank_label: self.bank_label.clone(),
                code: code.to_string(),
                verification: verification.to_string(),
                amount: amount.0,
                currency: self.currency.clone(),
            },
            RecordLayout::CodeOnly => Record::CodeOnly {
                code: code.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{
        config::Preset,
        generator::{RandomFieldGenerator, RandomSource},
    };

    fn fields(config: &CodeConfig) -> (GeneratedCode, VerificationCode, Amount) {
        let generator = RandomFieldGenerator::new(RandomSource::from_seed(1));
        (
            generator.generate_code(config),
            generator.generate_verification_code(),
            generator.generate_amount(&config.amount_range),
        )
    }

    #[test]
    fn full_record_should_render_four_lines() {
        let config = CodeConfig::from(Preset::Gated);
        let (code, verification, amount) = fields(&config);
        let expected = format!(
            "Bank: Demo Bank\nWithdrawal code: {}\nVerification code: {}\nAvailable amount: ${} MXN",
            code, verification, amount
        );

        let record = RecordAssembler::new(&config).assemble(code, verification, amount);

        assert_eq!(record.to_string(), expected);
        assert_eq!(record.to_string().lines().count(), record.line_count());
    }

    #[test]
    fn code_only_record_should_render_code() {
        let config = CodeConfig::from(Preset::Minimal);
        let (code, verification, amount) = fields(&config);
        let expected = code.to_string();

        let record = RecordAssembler::new(&config).assemble(code, verification, amount);

        assert_eq!(record, Record::CodeOnly { code: expected.clone() });
        assert_eq!(record.to_string(), expected);
        assert_eq!(record.code(), expected);
        assert_eq!(record.line_count(), 1);
    }

    #[test]
    fn assembling_should_be_deterministic() {
        let config = CodeConfig::from(Preset::Extended);
        let assembler = RecordAssembler::new(&config);
        let (code, verification, amount) = fields(&config);

        let first = assembler.assemble(code.clone(), verification.clone(), amount);
        let second = assembler.assemble(code, verification, amount);

        assert_eq!(first, second);
    }

    #[test]
    fn record_should_serialize_with_layout_tag() {
        let record = Record::CodeOnly {
            code: "100000000000".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"layout":"code_only","code":"100000000000"}"#);
    }
}
