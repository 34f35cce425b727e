pub mod card;
pub mod collection;
pub mod price;

pub use card::*;
pub use collection::*;
pub use price::*;
