use crate::domain::message::{Message, MessageId};

/// Selected message ids, in the order they were ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<MessageId>,
}

impl SelectionSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// Flip `id`, which must belong to `page`.
    pub fn toggle(&mut self, id: &str, page: &[Message]) {
        if let Some(pos) = self.ids.iter().position(|i| i == id) {
            self.ids.remove(pos);
        } else if page.iter().any(|m| m.id == id) {
            self.ids.push(id.to_string());
        }
    }

    /// Drop ids that are not on `page`.
    pub fn retain_page(&mut self, page: &[Message]) {
        self.ids.retain(|id| page.iter().any(|m| &m.id == id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[MessageId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[&str]) -> Vec<Message> {
        ids.iter()
            .map(|id| Message {
                id: id.to_string(),
                subject: None,
                body_preview: String::new(),
                from: None,
                received_date_time: None,
            })
            .collect()
    }

    #[test]
    fn toggles_in_click_order() {
        let p = page(&["a", "b", "c"]);
        let mut s = SelectionSet::default();
        s.toggle("c", &p);
        s.toggle("a", &p);
        s.toggle("b", &p);
        s.toggle("a", &p);
        assert_eq!(s.ids(), ["c", "b"]);
    }

    #[test]
    fn ignores_ids_outside_the_page() {
        let mut s = SelectionSet::default();
        s.toggle("zzz", &page(&["a"]));
        assert!(s.is_empty());
    }

    #[test]
    fn new_page_prunes_vanished_ids() {
        let mut s = SelectionSet::default();
        let p = page(&["a", "b"]);
        s.toggle("a", &p);
        s.toggle("b", &p);
        s.retain_page(&page(&["b", "c"]));
        assert_eq!(s.ids(), ["b"]);
        assert_eq!(s.len(), 1);
    }
}
