//! Result line schema
//!
//! The benchmark reports one space-separated line per run. Fields are
//! positional: the Nth token maps to the Nth schema field. Field 0 is the
//! categorical sampling mode and is never averaged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Columns reported by the ROLL benchmark, in emission order.
pub const ROLL_FIELDS: [&str; 13] = [
    "SamplingMode",
    "NumNodes",
    "m",
    "NumEdges",
    "NumComparisons",
    "TotalTime",
    "SamplingTime",
    "MaintenanceTime",
    "NumBuckets",
    "TreeCodeWordLength",
    "TreeOptimalHuffmanCodeWordLength",
    "TotalBucketsInserted",
    "TotalBucketsRemoved",
];

/// Ordered list of named fields a run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct ResultSchema {
    fields: Vec<String>,
}

/// Unchecked serialized form; deserialization goes through `ResultSchema::new`.
#[derive(Deserialize)]
struct RawSchema {
    fields: Vec<String>,
}

impl TryFrom<RawSchema> for ResultSchema {
    type Error = Error;

    fn try_from(raw: RawSchema) -> Result<Self> {
        Self::new(raw.fields)
    }
}

impl ResultSchema {
    /// Build a schema from an ordered field list.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the list is empty.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(Error::InvalidConfig(
                "result schema needs at least the sampling mode field".to_string(),
            ));
        }
        Ok(Self { fields })
    }

    /// The ROLL benchmark schema.
    #[must_use]
    pub fn roll() -> Self {
        Self {
            fields: ROLL_FIELDS.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Number of fields a well-formed line must carry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false; construction rejects empty schemas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All field names in positional order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Fields that carry numbers (everything after the mode label).
    pub fn numeric_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().skip(1).map(String::as_str)
    }

    /// Parse the tokens of a result line into a typed record.
    ///
    /// `command` is only used to make parse errors reproducible.
    ///
    /// # Errors
    ///
    /// `MalformedOutput` when there are fewer tokens than fields,
    /// `FieldParse` when a numeric field holds something else.
    pub fn parse(&self, tokens: &[String], command: &[String]) -> Result<ResultRecord> {
        let mode = match tokens.first() {
            Some(mode) if tokens.len() >= self.fields.len() => mode,
            _ => {
                return Err(Error::MalformedOutput {
                    command: command.to_vec(),
                    expected: self.fields.len().max(1),
                    actual: tokens.len(),
                    line: tokens.join(" "),
                })
            }
        };

        let mut values = BTreeMap::new();
        for (field, token) in self.fields.iter().zip(tokens).skip(1) {
            let value = token.parse::<f64>().map_err(|_| Error::FieldParse {
                field: field.clone(),
                token: token.clone(),
                command: command.to_vec(),
                line: tokens.join(" "),
            })?;
            values.insert(field.clone(), value);
        }

        Ok(ResultRecord {
            mode: mode.clone(),
            values,
        })
    }
}

impl Default for ResultSchema {
    fn default() -> Self {
        Self::roll()
    }
}

/// One parsed run: the mode label plus numeric fields keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    mode: String,
    values: BTreeMap<String, f64>,
}

impl ResultRecord {
    /// Sampling mode label (field 0).
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Value of a numeric field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Numeric fields in name order.
    pub fn values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
