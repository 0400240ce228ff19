use drm_model::SalesOrder;

use crate::scan::ScanReceipt;

/// What the route panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RouteStatus {
    #[default]
    Idle,
    Routed {
        so: SalesOrder,
        run: String,
        drop: String,
        scanned: usize,
        total: usize,
    },
    /// The last lookup missed; stale route data must not stay on screen.
    NotFound { input: String },
}

impl RouteStatus {
    pub fn routed(receipt: &ScanReceipt) -> Self {
        Self::Routed {
            so: receipt.so.clone(),
            run: receipt.route.run.clone(),
            drop: receipt.route.drop.clone(),
            scanned: receipt.scanned,
            total: receipt.total,
        }
    }
}
