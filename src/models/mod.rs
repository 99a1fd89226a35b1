pub mod common;
pub mod coupon;
pub mod element;
pub mod menu;
pub mod prediction;
pub mod promotion;
pub mod restaurant;
pub mod status;
pub mod user;

pub use common::*;
pub use coupon::*;
pub use element::*;
pub use menu::*;
pub use prediction::*;
pub use promotion::*;
pub use restaurant::*;
pub use status::*;
pub use user::*;
