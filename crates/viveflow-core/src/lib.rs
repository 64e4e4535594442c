pub mod layout;
pub mod normalize;
pub mod sanitize;
pub mod storage;

mod framework;

pub use framework::*;
pub use normalize::normalize;
