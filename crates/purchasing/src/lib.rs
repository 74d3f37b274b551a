//! `devmart-purchasing` — the purchase/licensing workflow.
//!
//! The core of the storefront: a three-state purchase flow (collect buyer
//! details, confirm the synthetic payment, issue a license and enable
//! download), download accounting against a per-purchase cap, and the
//! detached queue for best-effort side effects. All persistence goes
//! through the record store boundary; the workflow holds no ambient state
//! and takes the caller's identity as an explicit argument.

pub mod details;
pub mod error;
pub mod purchase;
pub mod side_effects;
pub mod workflow;

pub use details::BuyerDetails;
pub use error::PurchaseError;
pub use purchase::{
    DEFAULT_MAX_DOWNLOADS, DownloadAccountingError, PaymentStatus, Purchase, PurchaseRepository,
};
pub use side_effects::{SideEffect, SideEffectQueue};
pub use workflow::{CheckoutItem, DownloadTicket, PurchaseWorkflow, WorkflowState};
