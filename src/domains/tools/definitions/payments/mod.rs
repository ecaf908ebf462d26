//! Payment and receipt tools backed by the sessions and payment services.

mod get_receipt;
mod make_payment;

pub use get_receipt::{GetReceiptParams, GetReceiptTool};
pub use make_payment::{MakePaymentParams, MakePaymentTool};
