mod constants;
mod encoding;
mod messages;
mod parsing;


pub use constants::*;
pub use encoding::encode;
pub use messages::*;
pub use parsing::{ParseError, decode};
