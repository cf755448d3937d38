use std::cmp::Ordering;

use crate::model::Crypto;

/// In-memory, append-only collection of market snapshots for the current
/// session. Insertion order is significant: pagination and range queries
/// preserve it, and ties in the top-N sort keep it.
#[derive(Debug, Default)]
pub struct CryptoStore {
    records: Vec<Crypto>,
}

impl CryptoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record to the end of the collection.
    pub fn add(&mut self, record: Crypto) {
        self.records.push(record);
    }

    /// Appends a whole batch at once. Used by the shell to hand over a fully
    /// parsed fetch result so a failed fetch never leaves partial state.
    pub fn extend(&mut self, records: impl IntoIterator<Item = Crypto>) {
        self.records.extend(records);
    }

    pub fn all(&self) -> &[Crypto] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the 1-indexed page `page` of size `per_page`. Out-of-range
    /// pages (including page 0) yield an empty slice rather than an error.
    pub fn page(&self, page: usize, per_page: usize) -> &[Crypto] {
        if page == 0 {
            return &[];
        }
        let start = match (page - 1).checked_mul(per_page) {
            Some(start) if start < self.records.len() => start,
            _ => return &[],
        };
        let end = (start + per_page).min(self.records.len());
        &self.records[start..end]
    }

    /// Number of pages at the given page size; 0 for an empty store.
    pub fn total_pages(&self, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.records.len().div_ceil(per_page)
    }

    /// First record whose name matches case-insensitively. Linear scan.
    pub fn find_by_name(&self, name: &str) -> Option<&Crypto> {
        let needle = name.to_lowercase();
        self.records.iter().find(|c| c.name.to_lowercase() == needle)
    }

    /// The `n` records with the greatest market cap, descending. The sort is
    /// stable, so equal caps keep their insertion order. Asking for more than
    /// the store holds returns everything.
    pub fn top_by_market_cap(&self, n: usize) -> Vec<&Crypto> {
        let mut ranked: Vec<&Crypto> = self.records.iter().collect();
        ranked.sort_by(|a, b| {
            b.market_cap
                .partial_cmp(&a.market_cap)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }

    /// All records with `min <= price <= max`, in insertion order. An
    /// inverted range is simply empty.
    pub fn in_price_range(&self, min: f64, max: f64) -> Vec<&Crypto> {
        self.records
            .iter()
            .filter(|c| min <= c.price && c.price <= max)
            .collect()
    }

    pub fn total_market_cap(&self) -> f64 {
        self.records.iter().map(|c| c.market_cap).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(name: &str, price: f64, cap: f64) -> Crypto {
        Crypto::new(name, name.to_uppercase(), price, cap, 1_000_000.0)
    }

    fn sample_store() -> CryptoStore {
        let mut store = CryptoStore::new();
        store.add(coin("Bitcoin", 50000.0, 900.0));
        store.add(coin("Ethereum", 3000.0, 360.0));
        store.add(coin("Tether", 1.0, 83.0));
        store.add(coin("Solana", 150.0, 64.0));
        store
    }

    #[test]
    fn all_preserves_insertion_order() {
        let store = sample_store();
        let names: Vec<&str> = store.all().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Bitcoin", "Ethereum", "Tether", "Solana"]);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn pages_concatenate_to_all() {
        let store = sample_store();
        let mut collected = Vec::new();
        for page in 1..=store.total_pages(3) {
            collected.extend_from_slice(store.page(page, 3));
        }
        assert_eq!(collected, store.all());
        assert_eq!(store.page(2, 3).len(), 1);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let store = sample_store();
        assert!(store.page(0, 3).is_empty());
        assert!(store.page(3, 3).is_empty());
        assert!(store.page(usize::MAX, usize::MAX).is_empty());
        assert!(CryptoStore::new().page(1, 15).is_empty());
    }

    #[test]
    fn find_by_name_is_case_insensitive() {
        let store = sample_store();
        let hit = store.find_by_name("bitcoin").unwrap();
        assert_eq!(hit.name, "Bitcoin");
        assert_eq!(store.find_by_name("BITCOIN").unwrap(), hit);
        assert!(store.find_by_name("Dogecoin").is_none());
    }

    #[test]
    fn top_by_market_cap_sorts_descending() {
        let store = sample_store();
        let caps: Vec<f64> = store.top_by_market_cap(3).iter().map(|c| c.market_cap).collect();
        assert_eq!(caps, [900.0, 360.0, 83.0]);
    }

    #[test]
    fn top_by_market_cap_is_stable_on_ties() {
        let mut store = CryptoStore::new();
        store.add(coin("First", 1.0, 100.0));
        store.add(coin("Second", 2.0, 100.0));
        store.add(coin("Third", 3.0, 200.0));
        let names: Vec<&str> = store
            .top_by_market_cap(10)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["Third", "First", "Second"]);
    }

    #[test]
    fn top_larger_than_store_returns_everything() {
        let store = sample_store();
        assert_eq!(store.top_by_market_cap(100).len(), 4);
    }

    #[test]
    fn price_range_is_inclusive_and_ordered() {
        let store = sample_store();
        let names: Vec<&str> = store
            .in_price_range(1.0, 3000.0)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["Ethereum", "Tether", "Solana"]);
    }

    #[test]
    fn inverted_price_range_is_empty() {
        let store = sample_store();
        assert!(store.in_price_range(100.0, 1.0).is_empty());
    }

    #[test]
    fn total_market_cap_sums_all_records() {
        assert_eq!(CryptoStore::new().total_market_cap(), 0.0);
        let mut store = CryptoStore::new();
        store.add(coin("A", 1.0, 10.0));
        store.add(coin("B", 2.0, 20.5));
        assert_eq!(store.total_market_cap(), 30.5);
    }
}
