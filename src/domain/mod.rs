pub mod types;
pub mod message;
pub mod policy;

pub use types::*;
pub use message::*;
pub use policy::*;
