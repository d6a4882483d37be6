use super::Identity;
use fxhash::FxHashSet;
use std::collections::VecDeque;

/// The vehicles a trainee has already been credited for. Holds at most
/// `capacity` identities; pushing past that forgets the oldest, which may then
/// be credited again.
#[derive(Debug, Clone, PartialEq)]
pub struct CreditWindow {
    capacity: usize,
    order: VecDeque<Identity>,
    members: FxHashSet<Identity>,
}

impl CreditWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            members: FxHashSet::default(),
        }
    }

    #[inline]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    /// Remember `identity`, returning whichever identity was evicted to make room
    pub fn push(&mut self, identity: Identity) -> Option<Identity> {
        if !self.members.insert(identity) {
            return None;
        }
        self.order.push_back(identity);
        if self.order.len() > self.capacity {
            let evicted = self.order.pop_front()?;
            self.members.remove(&evicted);
            return Some(evicted);
        }
        None
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.order.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn traffic(index: usize) -> Identity {
        Identity::Traffic { index }
    }

    #[test]
    fn test_evicts_oldest() {
        let mut w = CreditWindow::new(3);
        for i in 0..3 {
            assert_eq!(None, w.push(traffic(i)));
        }
        assert_eq!(Some(traffic(0)), w.push(traffic(3)));
        assert_eq!(3, w.len());
        assert!(!w.contains(&traffic(0)));
        assert!(w.contains(&traffic(3)));
        assert_eq!(
            vec![traffic(1), traffic(2), traffic(3)],
            w.iter().copied().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_duplicate_push_is_ignored() {
        let mut w = CreditWindow::new(2);
        w.push(traffic(0));
        w.push(traffic(0));
        assert_eq!(1, w.len());
    }

    #[test]
    fn test_zero_capacity_remembers_nothing() {
        let mut w = CreditWindow::new(0);
        assert_eq!(Some(traffic(7)), w.push(traffic(7)));
        assert!(w.is_empty());
        assert!(!w.contains(&traffic(7)));
    }

    #[test]
    fn test_clear() {
        let mut w = CreditWindow::new(4);
        w.push(traffic(1));
        w.push(Identity::Trainee {
            generation: 0,
            index: 1,
        });
        w.clear();
        assert!(w.is_empty());
        assert!(!w.contains(&traffic(1)));
    }
}
