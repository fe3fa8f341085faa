/// One loosely-typed input row: source field name to raw string value.
///
/// Fields keep the order they were inserted in. A key that was never set is
/// absent, which is distinct from a key set to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Re-inserting an existing key replaces its value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value among `keys` that is present and non-empty.
    pub fn first_present(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_key() {
        let mut record = RawRecord::new();
        record.insert("sku", "A");
        record.insert("name", "Widget");
        record.insert("sku", "B");

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("sku"), Some("B"));
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["sku", "name"]);
    }

    #[test]
    fn first_present_skips_missing_and_empty() {
        let record: RawRecord = [("product_sku", ""), ("code", "C-1"), ("id", "42")]
            .into_iter()
            .collect();

        assert_eq!(record.first_present(&["sku", "product_sku", "code", "id"]), Some("C-1"));
        assert_eq!(record.first_present(&["sku"]), None);
    }

    #[test]
    fn absent_is_not_empty_string() {
        let record: RawRecord = [("col_0", "")].into_iter().collect();
        assert_eq!(record.get("col_0"), Some(""));
        assert_eq!(record.get("col_1"), None);
    }
}
