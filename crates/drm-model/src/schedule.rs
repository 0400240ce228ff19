use serde::{Deserialize, Serialize};

use crate::ids::SalesOrder;

/// A production-schedule line mapped back onto a sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub created_from: String,
    pub so: SalesOrder,
}
