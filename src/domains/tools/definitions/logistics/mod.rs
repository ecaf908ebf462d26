//! Logistics tools backed by the payment service.

mod delivery_estimate;
mod list_watches;
mod warranty_check;

pub use delivery_estimate::{DeliveryEstimateParams, DeliveryEstimateTool};
pub use list_watches::{ListWatchesParams, ListWatchesTool};
pub use warranty_check::{WarrantyCheckParams, WarrantyCheckTool};
