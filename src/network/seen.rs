use crate::network::Fingerprint;
use std::collections::VecDeque;

/// The most recent message fingerprints, oldest evicted first.
#[derive(Debug, Clone)]
pub struct SeenMessages {
    capacity: usize,
    entries: VecDeque<Fingerprint>,
}

impl SeenMessages {
    pub fn new(capacity: usize) -> SeenMessages {
        SeenMessages {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains(fingerprint)
    }

    /// Records `fingerprint`; false if it is already in the buffer.
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        if self.capacity == 0 {
            return true;
        }
        if self.contains(&fingerprint) {
            return false;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(fingerprint);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: usize) -> Fingerprint {
        Fingerprint::Transaction(id.to_string())
    }

    #[test]
    fn test_duplicates_are_reported() {
        let mut seen = SeenMessages::new(20);
        assert!(seen.insert(tx(1)));
        assert!(!seen.insert(tx(1)));
        assert!(seen.insert(Fingerprint::Block("1".to_string())));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let mut seen = SeenMessages::new(3);
        for id in 0..4 {
            assert!(seen.insert(tx(id)));
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains(&tx(0)));
        assert!(seen.contains(&tx(3)));
        assert!(seen.insert(tx(0)));
    }

    #[test]
    fn test_zero_capacity_remembers_nothing() {
        let mut seen = SeenMessages::new(0);
        assert!(seen.insert(tx(1)));
        assert!(seen.insert(tx(1)));
        assert!(seen.is_empty());
    }
}
