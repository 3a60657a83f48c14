//! Value objects returned by the backend API

mod listing;
mod poll;
mod purchase;
mod quote;

pub use listing::{Country, ServiceOffer};
pub use poll::PollUpdate;
pub use purchase::{PurchaseReceipt, Refund};
pub use quote::PriceQuote;
