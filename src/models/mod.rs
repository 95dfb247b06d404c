pub mod order;
pub mod session;

pub use order::{BillingInfo, Order, OrderItem, OrderStatus, StatusFilter};
pub use session::CurrentAdmin;
