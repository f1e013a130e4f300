pub mod providers;
pub mod scan;
pub mod util;
pub mod whitelist;

pub use providers::*;
pub use scan::*;
pub use util::*;
pub use whitelist::*;
