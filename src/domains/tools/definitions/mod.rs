//! Tool definitions module.
//!
//! One file per tool, grouped by the upstream concern they forward to.

pub mod logistics;
pub mod payments;

pub use logistics::{
    DeliveryEstimateParams, DeliveryEstimateTool, ListWatchesParams, ListWatchesTool,
    WarrantyCheckParams, WarrantyCheckTool,
};
pub use payments::{GetReceiptParams, GetReceiptTool, MakePaymentParams, MakePaymentTool};
