pub mod current_user;
pub mod product_id;

pub use current_user::{CurrentUser, MaybeUser};
pub use product_id::ProductId;
