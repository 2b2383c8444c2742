//! Scanner (C6): text to an ordered raw-token stream with line/column
//! tracking.

pub mod raw_token;
pub mod scanner;

pub use raw_token::{RawToken, RawTokenType};
pub use scanner::scan;
