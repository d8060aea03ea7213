use crate::libs::models::MessageRecord;

/// Ordered list of records backing the visible feed, in arrival order of child-added events.
#[derive(Debug, Default)]
pub struct FeedStore {
    records: Vec<MessageRecord>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MessageRecord) {
        self.records.push(record);
    }

    /// Remove the first record structurally equal to `record`. Returns its former index.
    pub fn remove_first(&mut self, record: &MessageRecord) -> Option<usize> {
        let index = self.records.iter().position(|r| r == record)?;
        self.records.remove(index);
        Some(index)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
