pub mod feed;
mod status;

pub use feed::*;
pub use status::*;
