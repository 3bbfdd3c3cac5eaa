//! Date parsing and monthly normalization.

mod normalizer;
mod parse;

pub use normalizer::{DateNormalizer, NormalizedDates, NormalizerConfig, YearMonth};
pub use parse::{parse_text, parse_value};
