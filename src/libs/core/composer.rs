use crate::libs::models::MessageRecord;

/// Whether the send action should be available for `input`.
///
/// Blank means nothing but characters up to and including U+0020, so control
/// characters count as blank and non-breaking spaces do not.
pub fn send_enabled_for(input: &str) -> bool {
    !input.trim_matches(|c: char| c <= ' ').is_empty()
}

/// Longest prefix of `text` that fits in `limit` UTF-16 code units.
fn truncate_utf16(text: &str, limit: usize) -> &str {
    let mut units = 0;
    for (index, c) in text.char_indices() {
        units += c.len_utf16();
        if units > limit {
            return &text[..index];
        }
    }
    text
}

/// Outgoing text field. Input longer than the limit is cut at capture time.
#[derive(Debug)]
pub struct Composer {
    input: String,
    limit: usize,
}

impl Composer {
    pub fn new(limit: usize) -> Self {
        Self {
            input: String::new(),
            limit,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_send_enabled(&self) -> bool {
        send_enabled_for(&self.input)
    }

    /// Replace the current input, truncating to the limit in UTF-16 code units.
    /// A surrogate pair that would straddle the limit is dropped whole.
    pub fn set_input(&mut self, text: &str) -> bool {
        self.input = truncate_utf16(text, self.limit).to_string();
        self.is_send_enabled()
    }

    /// Build the outgoing record and reset the field. `None` while send is disabled.
    pub fn take_message(&mut self, sender_name: &str) -> Option<MessageRecord> {
        if !self.is_send_enabled() {
            return None;
        }
        let text = std::mem::take(&mut self.input);
        Some(MessageRecord::text(sender_name, text))
    }
}
