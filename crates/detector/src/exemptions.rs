//! Run-scoped exemption list

use std::collections::HashSet;

use feedcheck_core::DEFAULT_EXEMPTIONS;

/// Symbols excluded from deviation checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemptionList {
    symbols: HashSet<String>,
}

impl ExemptionList {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Symbols whose reference proxies are known to be deprecated
    pub fn deprecated_references() -> Self {
        Self::new(DEFAULT_EXEMPTIONS.iter().copied())
    }

    pub fn is_exempt(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_list() {
        let list = ExemptionList::deprecated_references();
        assert_eq!(list.len(), 4);
        assert!(list.is_exempt("AMPL / USD"));
        assert!(list.is_exempt("STBT Proof of Reserves"));
        assert!(!list.is_exempt("ETH / USD"));
    }

    #[test]
    fn test_exact_match_only() {
        let list = ExemptionList::new(["NEIRO / USD"]);
        assert!(!list.is_exempt("neiro / usd"));
        assert!(!list.is_exempt("NEIRO/USD"));
        assert!(ExemptionList::default().is_empty());
    }
}
