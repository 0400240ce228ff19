use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cell::Cell;
use crate::coerce::{normalize_code, normalize_so};
use crate::error::ModelError;

/// Number of trailing characters holding a consignment's sequence number.
pub const SEQUENCE_SUFFIX_LEN: usize = 3;

/// Highest sequence number that fits the suffix; items of one order beyond it get no code.
pub const MAX_SEQUENCE: usize = 999;

/// A normalized (trimmed, upper-cased, non-empty) sales-order identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SalesOrder(String);

impl SalesOrder {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let normalized = normalize_code(&value);
        if normalized.is_empty() {
            return Err(ModelError::InvalidSalesOrder(value));
        }
        Ok(Self(normalized))
    }

    /// Read a sales order from a manifest cell; `None` for blank cells.
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        let normalized = normalize_so(cell);
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SalesOrder {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SalesOrder> for String {
    fn from(value: SalesOrder) -> Self {
        value.0
    }
}

impl fmt::Display for SalesOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One physical item of a sales order: the SO followed by a 3-digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConsignmentCode(String);

impl ConsignmentCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let normalized = normalize_code(&value);
        if normalized.is_empty() {
            return Err(ModelError::InvalidConsignmentCode(value));
        }
        Ok(Self(normalized))
    }

    /// Code for the `sequence`-th item of `so` (1-based, zero-padded to 3 digits).
    pub fn for_sequence(so: &SalesOrder, sequence: usize) -> Self {
        Self(format!("{}{:03}", so.as_str(), sequence))
    }

    /// The candidate sales order: the code with its sequence suffix removed.
    ///
    /// Returns `None` when nothing would remain.
    pub fn candidate_sales_order(&self) -> Option<SalesOrder> {
        let count = self.0.chars().count();
        if count <= SEQUENCE_SUFFIX_LEN {
            return None;
        }
        let prefix: String = self.0.chars().take(count - SEQUENCE_SUFFIX_LEN).collect();
        SalesOrder::new(prefix).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConsignmentCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConsignmentCode> for String {
    fn from(value: ConsignmentCode) -> Self {
        value.0
    }
}

impl fmt::Display for ConsignmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Depot a manifest and its scan log belong to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DepotId(String);

impl DepotId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidDepotId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DepotId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DepotId> for String {
    fn from(value: DepotId) -> Self {
        value.0
    }
}

impl fmt::Display for DepotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one scanning station so it can recognise its own echoes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OriginId(String);

impl OriginId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidOriginId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// A fresh per-process identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OriginId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OriginId> for String {
    fn from(value: OriginId) -> Self {
        value.0
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_codes_are_zero_padded() {
        let so = SalesOrder::new("so100").unwrap();
        assert_eq!(ConsignmentCode::for_sequence(&so, 1).as_str(), "SO100001");
        assert_eq!(ConsignmentCode::for_sequence(&so, 42).as_str(), "SO100042");
    }

    #[test]
    fn candidate_sales_order_drops_suffix() {
        let code = ConsignmentCode::new(" so252101001 ").unwrap();
        assert_eq!(code.as_str(), "SO252101001");
        assert_eq!(code.candidate_sales_order().unwrap().as_str(), "SO252101");
        assert!(ConsignmentCode::new("001").unwrap().candidate_sales_order().is_none());
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(SalesOrder::new("  ").is_err());
        assert!(DepotId::new("").is_err());
        assert!(SalesOrder::from_cell(&Cell::Empty).is_none());
    }
}
