//! Screening universe: constituents of the Taiwan 50 index

use crate::model::Symbol;

/// Taiwan 50 constituents scanned by the automatic screener
pub const TW50: [&str; 48] = [
    "2330.TW", "2317.TW", "2454.TW", "2308.TW", "2382.TW", "2412.TW", "2881.TW", "2882.TW",
    "2357.TW", "3711.TW", "2891.TW", "2303.TW", "2886.TW", "1301.TW", "1303.TW", "2408.TW",
    "2884.TW", "2885.TW", "3008.TW", "1216.TW", "2005.TW", "2327.TW", "2892.TW", "5880.TW",
    "2880.TW", "2912.TW", "3034.TW", "2379.TW", "1101.TW", "3231.TW", "2301.TW", "2603.TW",
    "2609.TW", "2615.TW", "2474.TW", "2883.TW", "2887.TW", "2890.TW", "5871.TW", "5876.TW",
    "9910.TW", "2395.TW", "3045.TW", "2345.TW", "6505.TW", "6669.TW", "1513.TW", "1503.TW",
];

/// Subjects used when a scan shortlists nothing
pub const FALLBACK: [&str; 2] = ["2330.TW", "2317.TW"];

pub fn tw50() -> Vec<Symbol> {
    to_symbols(&TW50)
}

pub fn fallback() -> Vec<Symbol> {
    to_symbols(&FALLBACK)
}

fn to_symbols(tickers: &[&str]) -> Vec<Symbol> {
    tickers.iter().filter_map(|t| Symbol::new(t).ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_universe_is_valid_and_unique() {
        let universe = tw50();
        assert_eq!(universe.len(), TW50.len());
        let unique: HashSet<_> = universe.iter().collect();
        assert_eq!(unique.len(), universe.len());
    }

    #[test]
    fn test_fallback_pair() {
        let names: Vec<_> = fallback().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["2330.TW", "2317.TW"]);
    }
}
