mod order_status;
mod payment;

pub use order_status::OrderStatus;
pub use payment::PaymentStatus;
