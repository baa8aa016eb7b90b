mod category;
mod history;
mod money;
mod month;
mod summary;
mod transaction;

pub use category::*;
pub use history::*;
pub use money::*;
pub use month::*;
pub use summary::*;
pub use transaction::*;
