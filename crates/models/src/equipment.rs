use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "database")]
use sea_orm::entity::prelude::{DeriveActiveEnum, EnumIter};

/// An integer on the wire that names no variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid {kind} code {code}")]
pub struct InvalidCode {
    pub kind: &'static str,
    pub code: i32,
}

/// Who owns a piece of equipment. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(EnumIter, DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "i32", db_type = "Integer"))]
#[serde(try_from = "i32", into = "i32")]
pub enum EquipmentCategory {
    /// Shared across the whole college, may have no laboratory
    #[cfg_attr(feature = "database", sea_orm(num_value = 1))]
    College,
    /// Belongs to a single laboratory
    #[cfg_attr(feature = "database", sea_orm(num_value = 2))]
    Lab,
}

impl EquipmentCategory {
    /// Lab-owned equipment must always point at a laboratory
    pub fn requires_lab(self) -> bool {
        self == Self::Lab
    }
}

impl TryFrom<i32> for EquipmentCategory {
    type Error = InvalidCode;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::College),
            2 => Ok(Self::Lab),
            _ => Err(InvalidCode {
                kind: "equipment category",
                code,
            }),
        }
    }
}

impl From<EquipmentCategory> for i32 {
    fn from(category: EquipmentCategory) -> Self {
        match category {
            EquipmentCategory::College => 1,
            EquipmentCategory::Lab => 2,
        }
    }
}

/// Operational state of a piece of equipment. Serialized as its integer code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(EnumIter, DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "i32", db_type = "Integer"))]
#[serde(try_from = "i32", into = "i32")]
pub enum EquipmentStatus {
    #[default]
    #[cfg_attr(feature = "database", sea_orm(num_value = 1))]
    Normal,
    #[cfg_attr(feature = "database", sea_orm(num_value = 2))]
    Maintenance,
    #[cfg_attr(feature = "database", sea_orm(num_value = 3))]
    Retired,
}

impl EquipmentStatus {
    pub fn is_reservable(self) -> bool {
        self == Self::Normal
    }
}

impl TryFrom<i32> for EquipmentStatus {
    type Error = InvalidCode;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Normal),
            2 => Ok(Self::Maintenance),
            3 => Ok(Self::Retired),
            _ => Err(InvalidCode {
                kind: "equipment status",
                code,
            }),
        }
    }
}

impl From<EquipmentStatus> for i32 {
    fn from(status: EquipmentStatus) -> Self {
        match status {
            EquipmentStatus::Normal => 1,
            EquipmentStatus::Maintenance => 2,
            EquipmentStatus::Retired => 3,
        }
    }
}
