//! Row encoding, list filters and transactional reads.

mod filter;
mod scan;
mod value_codec;

pub use filter::{Condition, Filter};
pub use scan::{read_row, referencing_ids, scan_rows};
pub use value_codec::{decode_row, encode_row};
