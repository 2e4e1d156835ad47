use crate::error::{KaResult, KeyAdaptError};
use crate::{KeyCode, KeyboardHash};
use serde::{Deserialize, Serialize};

pub mod grid;
pub mod kle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned touch region of one key. Edges only move as a whole, so the
/// four corners always describe a rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hitbox {
    code: KeyCode,
    top_left: Point,
    top_right: Point,
    bottom_left: Point,
    bottom_right: Point,
}

impl Hitbox {
    pub fn new(code: KeyCode, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            code,
            top_left: Point::new(left, top),
            top_right: Point::new(right, top),
            bottom_left: Point::new(left, bottom),
            bottom_right: Point::new(right, bottom),
        }
    }

    /// Builds a hitbox from explicit corners, rejecting anything that is not
    /// an axis-aligned rectangle.
    pub fn from_corners(
        code: KeyCode,
        top_left: Point,
        top_right: Point,
        bottom_left: Point,
        bottom_right: Point,
    ) -> KaResult<Self> {
        let aligned = top_left.x == bottom_left.x
            && top_right.x == bottom_right.x
            && top_left.y == top_right.y
            && bottom_left.y == bottom_right.y;

        if !aligned {
            return Err(KeyAdaptError::Validation(format!(
                "Hitbox for key {} is not an axis-aligned rectangle",
                code
            )));
        }

        Ok(Self {
            code,
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        })
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn top_left(&self) -> Point {
        self.top_left
    }

    pub fn top_right(&self) -> Point {
        self.top_right
    }

    pub fn bottom_left(&self) -> Point {
        self.bottom_left
    }

    pub fn bottom_right(&self) -> Point {
        self.bottom_right
    }

    #[inline(always)]
    pub fn left(&self) -> i32 {
        self.top_left.x
    }

    #[inline(always)]
    pub fn right(&self) -> i32 {
        self.top_right.x
    }

    #[inline(always)]
    pub fn top(&self) -> i32 {
        self.top_left.y
    }

    #[inline(always)]
    pub fn bottom(&self) -> i32 {
        self.bottom_left.y
    }

    pub fn width(&self) -> i32 {
        self.top_right.x - self.top_left.x
    }

    pub fn height(&self) -> i32 {
        self.bottom_left.y - self.top_left.y
    }

    pub fn set_top(&mut self, top: i32) {
        self.top_left.y = top;
        self.top_right.y = top;
    }

    pub fn set_bottom(&mut self, bottom: i32) {
        self.bottom_left.y = bottom;
        self.bottom_right.y = bottom;
    }

    pub fn set_left(&mut self, left: i32) {
        self.top_left.x = left;
        self.bottom_left.x = left;
    }

    pub fn set_right(&mut self, right: i32) {
        self.top_right.x = right;
        self.bottom_right.x = right;
    }

    /// True when the point lies inside the rectangle grown by one width
    /// horizontally and one height vertically on every side.
    pub fn is_close(&self, x: i32, y: i32) -> bool {
        let w = self.width();
        let h = self.height();
        self.left() - w <= x
            && x <= self.right() + w
            && self.top() - h <= y
            && y <= self.bottom() + h
    }
}

impl std::fmt::Display for Hitbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "key {} spanning x = {}..{}, y = {}..{}",
            self.code,
            self.left(),
            self.right(),
            self.top(),
            self.bottom()
        )
    }
}

/// Hitboxes of one keyboard in row-major reading order (top-left to bottom-right).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHitboxSet")]
pub struct HitboxSet {
    keyboard_hash: KeyboardHash,
    hitboxes: Vec<Hitbox>,
}

#[derive(Deserialize)]
struct RawHitboxSet {
    keyboard_hash: KeyboardHash,
    hitboxes: Vec<Hitbox>,
}

impl TryFrom<RawHitboxSet> for HitboxSet {
    type Error = KeyAdaptError;

    fn try_from(raw: RawHitboxSet) -> KaResult<Self> {
        HitboxSet::from_hitboxes(raw.keyboard_hash, raw.hitboxes)
    }
}

impl HitboxSet {
    pub fn new(keyboard_hash: KeyboardHash) -> Self {
        Self {
            keyboard_hash,
            hitboxes: Vec::new(),
        }
    }

    pub fn from_hitboxes(keyboard_hash: KeyboardHash, hitboxes: Vec<Hitbox>) -> KaResult<Self> {
        let mut set = Self::new(keyboard_hash);
        for hb in hitboxes {
            set.push(hb)?;
        }
        Ok(set)
    }

    /// Appends a hitbox; the caller supplies them in reading order.
    pub fn push(&mut self, hitbox: Hitbox) -> KaResult<()> {
        if self.find_by_code(hitbox.code()).is_some() {
            return Err(KeyAdaptError::Validation(format!(
                "Duplicate key code {} in hitboxes of keyboard {}",
                hitbox.code(),
                self.keyboard_hash
            )));
        }
        self.hitboxes.push(hitbox);
        Ok(())
    }

    pub fn keyboard_hash(&self) -> KeyboardHash {
        self.keyboard_hash
    }

    pub fn find_by_code(&self, code: KeyCode) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|hb| hb.code() == code)
    }

    /// First hitbox (in reading order) whose top edge is at `top_y`.
    pub fn find_row_start(&self, top_y: i32) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|hb| hb.top() == top_y)
    }

    pub fn len(&self) -> usize {
        self.hitboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hitboxes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hitbox> {
        self.hitboxes.iter()
    }

    pub fn as_slice(&self) -> &[Hitbox] {
        &self.hitboxes
    }

    /// Mutable view for edge moves. The slice cannot grow, and codes are
    /// immutable, so uniqueness is kept.
    pub fn as_mut_slice(&mut self) -> &mut [Hitbox] {
        &mut self.hitboxes
    }
}
