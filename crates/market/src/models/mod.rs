//! Persisted marketplace records.
//!
//! Every record is flat so it maps onto one row of its collection. Field
//! names serialize as camelCase, which is the interchange shape of exported
//! data.

pub mod discount;
pub mod order;
pub mod product;
pub mod question;
pub mod user;

pub use discount::{Adjustment, Discount, SalePromotion};
pub use order::Order;
pub use product::{Product, ProductDraft, can_manage};
pub use question::Question;
pub use user::{CurrentUser, User};
