//! Data access port trait.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// All bars for `pair`, oldest first.
    fn fetch_bars(&self, pair: &str) -> Result<Vec<Bar>, SigtraderError>;

    /// Pairs this source can serve.
    fn list_pairs(&self) -> Result<Vec<String>, SigtraderError>;
}
