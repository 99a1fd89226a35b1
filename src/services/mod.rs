pub mod coupon_service;
pub mod identity_service;
pub mod menu_service;
pub mod prediction_service;
pub mod restaurant_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use coupon_service::*;
pub use identity_service::*;
pub use menu_service::*;
pub use prediction_service::*;
pub use restaurant_service::*;
