//! HTTP transport: the payout router and the separate admin router.

pub mod admin;
pub mod payout;

pub use admin::admin_router;
pub use payout::payout_router;
