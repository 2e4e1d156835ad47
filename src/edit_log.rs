use crate::{KeyCode, KeyboardHash};
use serde::{Deserialize, Serialize};

/// Character recorded for entries whose text is not known.
pub const UNKNOWN_CHAR: char = '\u{FFFD}';
/// Coordinate recorded when the touch location is not known.
pub const UNKNOWN_POS: i32 = -1;
/// Code recorded for slots whose key is not known.
pub const UNKNOWN_CODE: KeyCode = -1;
/// Code recorded for text that was inserted without a key press.
pub const PLACEHOLDER_CODE: KeyCode = 0;

/// What one key press contributes to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystroke {
    pub code: KeyCode,
    pub ch: char,
    pub x: i32,
    pub y: i32,
    pub keyboard_hash: KeyboardHash,
}

impl Keystroke {
    pub const fn new(code: KeyCode, ch: char, x: i32, y: i32, keyboard_hash: KeyboardHash) -> Self {
        Self {
            code,
            ch,
            x,
            y,
            keyboard_hash,
        }
    }

    /// Stand-in for text that arrived without touch data (paste, autocorrect).
    pub const fn placeholder() -> Self {
        Self::new(PLACEHOLDER_CODE, UNKNOWN_CHAR, UNKNOWN_POS, UNKNOWN_POS, 0)
    }

    const fn unknown() -> Self {
        Self::new(UNKNOWN_CODE, UNKNOWN_CHAR, UNKNOWN_POS, UNKNOWN_POS, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogItem {
    text_pos: i32,
    code: KeyCode,
    ch: char,
    pos_x: i32,
    pos_y: i32,
    keyboard_hash: KeyboardHash,
    is_deleted: bool,
}

impl LogItem {
    fn new(text_pos: i32, stroke: Keystroke) -> Self {
        Self {
            text_pos,
            code: stroke.code,
            ch: stroke.ch,
            pos_x: stroke.x,
            pos_y: stroke.y,
            keyboard_hash: stroke.keyboard_hash,
            is_deleted: false,
        }
    }

    /// Revives/overwrites this slot. A tombstone that already holds a real
    /// touch location keeps it (and its keyboard).
    fn overwrite(&mut self, text_pos: i32, stroke: Keystroke) {
        if !self.is_deleted || self.pos_x == UNKNOWN_POS || self.pos_y == UNKNOWN_POS {
            self.pos_x = stroke.x;
            self.pos_y = stroke.y;
            self.keyboard_hash = stroke.keyboard_hash;
        }
        self.text_pos = text_pos;
        self.code = stroke.code;
        self.ch = stroke.ch;
        self.is_deleted = false;
    }

    pub fn text_pos(&self) -> i32 {
        self.text_pos
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn ch(&self) -> char {
        self.ch
    }

    pub fn pos_x(&self) -> i32 {
        self.pos_x
    }

    pub fn pos_y(&self) -> i32 {
        self.pos_y
    }

    pub fn keyboard_hash(&self) -> KeyboardHash {
        self.keyboard_hash
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Live entry with a real key press and a known touch location.
    pub fn is_complete(&self) -> bool {
        !self.is_deleted
            && self.code != UNKNOWN_CODE
            && self.code != PLACEHOLDER_CODE
            && self.pos_x != UNKNOWN_POS
            && self.pos_y != UNKNOWN_POS
    }
}

/// Cursor-addressed keystroke log.
///
/// Entries stay in append order; `text_pos` is the logical cursor address.
/// Deleted entries are tombstoned rather than removed so their touch
/// locations survive later edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLog {
    items: Vec<LogItem>,
}

impl EditLog {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(256),
        }
    }

    /// Log pre-filled with `len` unknown entries at positions `0..len`.
    pub fn with_placeholders(len: usize) -> Self {
        let items = (0..len)
            .map(|i| LogItem::new(i as i32, Keystroke::unknown()))
            .collect();
        Self { items }
    }

    /// Index of the first entry at `pos`, scanning from index `pos` onward
    /// (an entry's index is never below its live position).
    fn find(&self, pos: i32, skip_deleted: bool) -> Option<usize> {
        let start = (pos as usize).min(self.items.len());
        self.items[start..]
            .iter()
            .position(|it| it.text_pos == pos && !(skip_deleted && it.is_deleted))
            .map(|offset| start + offset)
    }

    fn shift_from(&mut self, index: usize, delta: i32) {
        for item in &mut self.items[index..] {
            item.text_pos += delta;
        }
    }

    fn set_at(&mut self, pos: i32, stroke: Keystroke) {
        if pos < 0 {
            return;
        }

        let resume = match self.find(pos, false) {
            None => {
                self.items.push(LogItem::new(pos, stroke));
                self.items.len()
            }
            Some(i) if self.items[i].is_deleted => {
                self.items[i].overwrite(pos, stroke);
                i + 1
            }
            Some(i) => {
                self.items.insert(i, LogItem::new(pos, stroke));
                i + 1
            }
        };

        self.shift_from(resume, 1);
    }

    /// Records a key press at `cursor_start`, replacing the selection
    /// `[cursor_start, cursor_end)` first if there is one.
    pub fn set(&mut self, cursor_start: i32, cursor_end: i32, stroke: Keystroke) {
        if cursor_start < cursor_end {
            self.delete(cursor_start, cursor_end);
        }
        self.set_at(cursor_start, stroke);
    }

    /// Tombstones the first live entry at `pos` and pulls later entries back by one.
    pub fn delete_at(&mut self, pos: i32) {
        if pos < 0 {
            return;
        }

        if let Some(i) = self.find(pos, true) {
            self.items[i].is_deleted = true;
            self.shift_from(i + 1, -1);
        }
    }

    /// Deletes the range `[cursor_start, cursor_end)`.
    pub fn delete(&mut self, cursor_start: i32, cursor_end: i32) {
        for _ in cursor_start..cursor_end {
            self.delete_at(cursor_start);
        }
    }

    pub fn cut(&mut self, cursor_start: i32, cursor_end: i32) {
        self.delete(cursor_start, cursor_end);
    }

    /// Inserts `count` placeholder entries at `cursor_start`, replacing the
    /// selection first if there is one.
    pub fn insert(&mut self, cursor_start: i32, cursor_end: i32, count: usize) {
        if cursor_start < cursor_end {
            self.delete(cursor_start, cursor_end);
        }
        for i in 0..count {
            self.set_at(cursor_start + i as i32, Keystroke::placeholder());
        }
    }

    /// Concatenates another log. Text positions are NOT renumbered.
    pub fn append(&mut self, other: EditLog) {
        self.items.extend(other.items);
    }

    /// Live text, unknown characters rendered as `UNKNOWN_CHAR`.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .filter(|it| !it.is_deleted)
            .map(|it| it.ch)
            .collect()
    }

    /// Checks the logged text against the real one; unknown characters in
    /// the log match anything.
    pub fn matches_text(&self, actual: &str) -> bool {
        let logged: Vec<char> = self.text().chars().collect();
        let actual: Vec<char> = actual.chars().collect();

        if logged.len() != actual.len() {
            return false;
        }

        logged
            .iter()
            .zip(actual.iter())
            .all(|(&l, &a)| l == UNKNOWN_CHAR || l == a)
    }

    /// One row per entry: `[text_pos, code, pos_x, pos_y, is_deleted, keyboard_hash]`.
    pub fn to_array(&self) -> Vec<[i32; 6]> {
        self.items
            .iter()
            .map(|it| {
                [
                    it.text_pos,
                    it.code,
                    it.pos_x,
                    it.pos_y,
                    it.is_deleted as i32,
                    it.keyboard_hash,
                ]
            })
            .collect()
    }

    pub fn complete_entries(&self) -> impl Iterator<Item = &LogItem> {
        self.items.iter().filter(|it| it.is_complete())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
