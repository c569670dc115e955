use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Kind of mutation recorded in the audit log (stored as at most 20 characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    LabCreate,
    LabUpdate,
    LabDelete,
    EquipmentCreate,
    EquipmentUpdate,
    EquipmentDelete,
    SlotCreate,
    SlotDeactivate,
    ReservationCreate,
    ReservationApprove,
    ReservationReject,
    ReservationCancel,
    StudentCreate,
    StudentAssignLab,
}
