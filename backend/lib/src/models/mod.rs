pub mod responses;
pub mod shop;
pub mod stats;

pub use responses::*;
pub use shop::{Shop, ShopField};
pub use stats::GroupCounts;
