pub mod fit;
pub mod tcx;
#[cfg(test)]
pub mod test_util;

use crate::activity::Activity;

/// Bytes 8..12 of every FIT file header.
pub const FIT_MAGIC: &[u8; 4] = b".FIT";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FIT decode error: {0}")]
    Decode(#[from] fitparser::Error),

    #[error("missing .FIT header marker")]
    NotFit,
}

// turn one input file into activities
pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<Activity>, ParseError>;

    fn name(&self) -> &'static str;
}

pub fn is_fit(data: &[u8]) -> bool {
    data.len() >= 12 && &data[8..12] == FIT_MAGIC
}
