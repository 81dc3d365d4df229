pub mod config;
pub mod reset;
pub mod status;
pub mod sync;
pub mod watch;

pub use config::*;
pub use reset::*;
pub use status::*;
pub use sync::*;
pub use watch::*;
