use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::FieldError;

/// Column names in the order the model was trained on.
pub const COLUMNS: [&str; 11] = [
    "no_of_dependents",
    "education",
    "self_employed",
    "income_annum",
    "loan_amount",
    "loan_term",
    "cibil_score",
    "residential_assets_value",
    "commercial_assets_value",
    "luxury_assets_value",
    "bank_asset_value",
];

/// Raw key/value pairs of one form submission, in submission order.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct FormFields(pub Vec<(String, String)>);

impl FormFields {
    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormFields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One applicant, laid out as the single-row table the model expects.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanApplication {
    pub no_of_dependents: i64,
    pub education: String,
    pub self_employed: String,
    pub income_annum: f64,
    pub loan_amount: f64,
    pub loan_term: i64,
    pub cibil_score: f64,
    pub residential_assets_value: f64,
    pub commercial_assets_value: f64,
    pub luxury_assets_value: f64,
    pub bank_asset_value: f64,
}

/// A single cell of the record.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl fmt::Display for FeatureValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
            FeatureValue::Text(v) => write!(f, "{v:?}"),
        }
    }
}

impl LoanApplication {
    /// Coerces the submitted form into a record.
    ///
    /// Absent keys and blank numeric values fall back to zero (text fields to
    /// the empty string). Anything else must parse, or the first offending
    /// field in column order is reported.
    pub fn from_form(form: &FormFields) -> Result<Self, FieldError> {
        Ok(LoanApplication {
            no_of_dependents: number(form, "no_of_dependents", "integer")?,
            education: text(form, "education"),
            self_employed: text(form, "self_employed"),
            income_annum: number(form, "income_annum", "float")?,
            loan_amount: number(form, "loan_amount", "float")?,
            loan_term: number(form, "loan_term", "integer")?,
            cibil_score: number(form, "cibil_score", "float")?,
            residential_assets_value: number(form, "residential_assets_value", "float")?,
            commercial_assets_value: number(form, "commercial_assets_value", "float")?,
            luxury_assets_value: number(form, "luxury_assets_value", "float")?,
            bank_asset_value: number(form, "bank_asset_value", "float")?,
        })
    }

    /// Column name and value pairs, in `COLUMNS` order.
    pub fn columns(&self) -> [(&'static str, FeatureValue<'_>); 11] {
        [
            (COLUMNS[0], FeatureValue::Int(self.no_of_dependents)),
            (COLUMNS[1], FeatureValue::Text(&self.education)),
            (COLUMNS[2], FeatureValue::Text(&self.self_employed)),
            (COLUMNS[3], FeatureValue::Float(self.income_annum)),
            (COLUMNS[4], FeatureValue::Float(self.loan_amount)),
            (COLUMNS[5], FeatureValue::Int(self.loan_term)),
            (COLUMNS[6], FeatureValue::Float(self.cibil_score)),
            (COLUMNS[7], FeatureValue::Float(self.residential_assets_value)),
            (COLUMNS[8], FeatureValue::Float(self.commercial_assets_value)),
            (COLUMNS[9], FeatureValue::Float(self.luxury_assets_value)),
            (COLUMNS[10], FeatureValue::Float(self.bank_asset_value)),
        ]
    }

    pub fn value(&self, column: &str) -> Option<FeatureValue<'_>> {
        self.columns()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for LoanApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.columns().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

fn text(form: &FormFields, field: &'static str) -> String {
    form.get(field).unwrap_or_default().to_string()
}

fn number<T: FromStr + Default>(
    form: &FormFields,
    field: &'static str,
    expected: &'static str,
) -> Result<T, FieldError> {
    let raw = match form.get(field) {
        Some(raw) => raw,
        None => return Ok(T::default()),
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse().map_err(|_| FieldError {
        field,
        value: raw.to_string(),
        expected,
    })
}

/// Class predicted by the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassLabel {
    Numeric(f64),
    Text(String),
}

impl ClassLabel {
    /// Only the numeric class `0` is an approval.
    pub fn is_approved(&self) -> bool {
        matches!(self, ClassLabel::Numeric(v) if *v == 0.0)
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Numeric(v) => write!(f, "{v}"),
            ClassLabel::Text(v) => f.write_str(v),
        }
    }
}

/// Result of one `/predict` submission, rendered back into the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `confidence` is the top class probability as a percentage, when known.
    Approved { confidence: Option<f32> },
    Rejected { confidence: Option<f32> },
    InvalidInput(FieldError),
    ModelUnavailable,
    ProcessingError(String),
}

impl Outcome {
    pub fn from_label(label: &ClassLabel, confidence: Option<f32>) -> Self {
        if label.is_approved() {
            Outcome::Approved { confidence }
        } else {
            Outcome::Rejected { confidence }
        }
    }

    pub fn confidence(&self) -> Option<f32> {
        match self {
            Outcome::Approved { confidence } | Outcome::Rejected { confidence } => *confidence,
            _ => None,
        }
    }

    // Confidence is logged by the handler but does not change the wording.
    pub fn message(&self) -> String {
        match self {
            Outcome::Approved { .. } => "🎉 Loan Will be Approved!".to_string(),
            Outcome::Rejected { .. } => "❌ Loan Might Get Rejected".to_string(),
            Outcome::InvalidInput(e) => format!("⚠️ Invalid input data: {e}"),
            Outcome::ModelUnavailable => {
                "❌ Model not loaded. Please check the model file.".to_string()
            }
            Outcome::ProcessingError(detail) => {
                format!("⚠️ Error processing request: {detail}")
            }
        }
    }
}
