use std::io::{Read, Write};
use std::path::Path;

use fee_core::ConstructionCode;
use fee_core::tables::{
    ConstructionTableError, ConstructionType, ConstructionTypeTable, StructuralPricing,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading construction type data.
#[derive(Debug, Error)]
pub enum ConstructionTypeLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid construction code '{0}'")]
    InvalidCode(String),

    #[error("Unknown pricing kind '{kind}' for '{code}' (expected fixed, per_m2 or retaining_wall)")]
    UnknownKind { code: String, kind: String },

    #[error("'{code}' is missing required column '{column}'")]
    MissingColumn { code: String, column: &'static str },

    #[error("Invalid table: {0}")]
    Table(#[from] ConstructionTableError),
}

impl From<csv::Error> for ConstructionTypeLoaderError {
    fn from(err: csv::Error) -> Self {
        ConstructionTypeLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from a construction types CSV file.
///
/// - `code`: category and item, e.g. `II.1`
/// - `name`: display name
/// - `kind`: `fixed`, `per_m2` or `retaining_wall`
/// - `base_price`: the fixed fee, the rate per m², or the fee per wall section
/// - `min_area` / `max_area`: optional area bounds of a `per_m2` type
/// - `per_metre`: rate per additional metre of a `retaining_wall` type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstructionTypeRecord {
    pub code: String,
    pub name: String,
    pub kind: String,
    pub base_price: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub min_area: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_area: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub per_metre: Option<Decimal>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

impl ConstructionTypeRecord {
    fn into_type(self) -> Result<ConstructionType, ConstructionTypeLoaderError> {
        let code = ConstructionCode::parse(self.code.trim())
            .ok_or_else(|| ConstructionTypeLoaderError::InvalidCode(self.code.clone()))?;

        let pricing = match self.kind.trim() {
            "fixed" => StructuralPricing::Fixed {
                fee: self.base_price,
            },
            "per_m2" => StructuralPricing::PerSquareMetre {
                rate: self.base_price,
                min_area: self.min_area,
                max_area: self.max_area,
            },
            "retaining_wall" => StructuralPricing::RetainingWall {
                section_fee: self.base_price,
                per_metre: self.per_metre.ok_or_else(|| {
                    ConstructionTypeLoaderError::MissingColumn {
                        code: self.code.clone(),
                        column: "per_metre",
                    }
                })?,
            },
            other => {
                return Err(ConstructionTypeLoaderError::UnknownKind {
                    code: self.code.clone(),
                    kind: other.to_string(),
                });
            }
        };

        Ok(ConstructionType {
            code,
            name: self.name.trim().to_string(),
            pricing,
        })
    }

    fn from_type(ty: &ConstructionType) -> Self {
        let (min_area, max_area, per_metre) = match &ty.pricing {
            StructuralPricing::Fixed { .. } => (None, None, None),
            StructuralPricing::PerSquareMetre {
                min_area, max_area, ..
            } => (*min_area, *max_area, None),
            StructuralPricing::RetainingWall { per_metre, .. } => (None, None, Some(*per_metre)),
        };
        Self {
            code: ty.code.to_string(),
            name: ty.name.clone(),
            kind: ty.pricing.kind().to_string(),
            base_price: ty.pricing.base_price(),
            min_area,
            max_area,
            per_metre,
        }
    }
}

/// Loader for structural construction types from CSV files.
///
/// The resulting table replaces the built-in one for structural pricing.
pub struct ConstructionTypeLoader;

impl ConstructionTypeLoader {
    /// Parse construction type records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ConstructionTypeRecord>, ConstructionTypeLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ConstructionTypeRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate records and build a table from them, in file order.
    pub fn build(records: Vec<ConstructionTypeRecord>) -> Result<ConstructionTypeTable, ConstructionTypeLoaderError> {
        let types = records
            .into_iter()
            .map(ConstructionTypeRecord::into_type)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ConstructionTypeTable::new(types)?)
    }

    pub fn load<R: Read>(reader: R) -> Result<ConstructionTypeTable, ConstructionTypeLoaderError> {
        Self::build(Self::parse(reader)?)
    }

    pub fn load_path(path: &Path) -> Result<ConstructionTypeTable, ConstructionTypeLoaderError> {
        let file = std::fs::File::open(path)?;
        let table = Self::load(file)?;
        tracing::info!(path = %path.display(), types = table.types().len(), "loaded construction types");
        Ok(table)
    }

    /// Write `table` in the same CSV layout [`Self::parse`] reads.
    pub fn write<W: Write>(
        table: &ConstructionTypeTable,
        writer: W,
    ) -> Result<(), ConstructionTypeLoaderError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for ty in table.types() {
            csv_writer.serialize(ConstructionTypeRecord::from_type(ty))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
