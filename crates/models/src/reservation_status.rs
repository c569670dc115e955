use serde::{Deserialize, Serialize};

#[cfg(feature = "database")]
use sea_orm::entity::prelude::{DeriveActiveEnum, EnumIter};

/// Lifecycle of a reservation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(EnumIter, DeriveActiveEnum))]
#[cfg_attr(feature = "database", sea_orm(rs_type = "i32", db_type = "Integer"))]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Waiting for the approving teacher
    #[default]
    #[cfg_attr(feature = "database", sea_orm(num_value = 0))]
    Pending,
    #[cfg_attr(feature = "database", sea_orm(num_value = 1))]
    Approved,
    #[cfg_attr(feature = "database", sea_orm(num_value = 2))]
    Rejected,
    #[cfg_attr(feature = "database", sea_orm(num_value = 3))]
    Cancelled,
}

impl ReservationStatus {
    /// A live reservation still holds its time slot
    pub fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub fn is_reviewable(self) -> bool {
        self == Self::Pending
    }
}

#[cfg(test)]
mod test {
    use crate::reservation_status::ReservationStatus;

    #[test]
    fn test_live_statuses() {
        assert!(ReservationStatus::Pending.is_live());
        assert!(ReservationStatus::Approved.is_live());
        assert!(!ReservationStatus::Rejected.is_live());
        assert!(!ReservationStatus::Cancelled.is_live());
    }

    #[test]
    fn test_only_pending_is_reviewable() {
        assert!(ReservationStatus::default().is_reviewable());
        assert!(!ReservationStatus::Approved.is_reviewable());
    }
}
