mod health_check;
pub mod cart;
pub mod menu;
pub mod order;

pub use health_check::*;
