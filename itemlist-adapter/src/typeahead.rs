use itemlist::ItemList;

/// Buffer reset delay used by [`TypeAhead::default`].
pub const DEFAULT_TYPE_AHEAD_RESET_MS: u64 = 500;

/// Incremental keyboard search over the rows of an [`ItemList`].
///
/// Typed characters accumulate until no key arrives for `reset_ms`; the buffer is then matched
/// case-insensitively against the start of each row's search text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAhead {
    buffer: String,
    last_key_ms: Option<u64>,
    reset_ms: u64,
}

impl Default for TypeAhead {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_AHEAD_RESET_MS)
    }
}

impl TypeAhead {
    pub fn new(reset_ms: u64) -> Self {
        Self {
            buffer: String::new(),
            last_key_ms: None,
            reset_ms,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.last_key_ms = None;
    }

    /// Appends a character, first dropping a buffer that has gone stale.
    pub fn push(&mut self, ch: char, now_ms: u64) -> &str {
        let expired = self
            .last_key_ms
            .is_some_and(|last| now_ms.saturating_sub(last) >= self.reset_ms);
        if expired {
            self.buffer.clear();
        }
        self.buffer.extend(ch.to_lowercase());
        self.last_key_ms = Some(now_ms);
        &self.buffer
    }

    /// Next row at or after `start` (wrapping) whose search text starts with the buffer.
    pub fn find(&self, list: &mut ItemList, start: usize) -> Option<usize> {
        if self.buffer.is_empty() {
            return None;
        }
        let field = list.options().search_field().to_owned();
        list.find_next_match(
            |item, _| item.text(&field).to_lowercase().starts_with(&self.buffer),
            start,
        )
    }

    /// Handles one key press while the row at `current` is active.
    ///
    /// A fresh single character starts searching after the current row, so repeating a letter
    /// cycles through rows that start with it.
    pub fn on_key(
        &mut self,
        list: &mut ItemList,
        ch: char,
        now_ms: u64,
        current: Option<usize>,
    ) -> Option<usize> {
        let single = self.push(ch, now_ms).chars().count() == 1;
        let start = match current {
            Some(c) if single => c + 1,
            Some(c) => c,
            None => 0,
        };
        self.find(list, start)
    }
}
