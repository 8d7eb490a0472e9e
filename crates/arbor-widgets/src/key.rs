//! Widget keys.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GLOBAL_KEY: AtomicU64 = AtomicU64::new(1);

/// Key that lets an element move anywhere in the tree within one frame.
///
/// At most one live element may carry a given global key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalKey(u64);

impl GlobalKey {
    pub fn new() -> Self {
        Self(NEXT_GLOBAL_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for GlobalKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GlobalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalKey#{}", self.0)
    }
}

/// Identity hint that is independent of a widget's position among its siblings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(Rc<str>),
    Global(GlobalKey),
}

impl Key {
    pub fn global(&self) -> Option<GlobalKey> {
        match self {
            Key::Global(key) => Some(*key),
            _ => None,
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<GlobalKey> for Key {
    fn from(value: GlobalKey) -> Self {
        Key::Global(value)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(value) => write!(f, "[{value}]"),
            Key::Str(value) => write!(f, "[<{value}>]"),
            Key::Global(key) => write!(f, "[{key:?}]"),
        }
    }
}
