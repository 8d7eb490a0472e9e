use arbor_geometry::Size;

use crate::key::Key;
use crate::widget::{Widget, WidgetKind, WidgetRef};

/// Roots a render tree with its own pipeline owner.
///
/// The outermost view binds to the framework's root pipeline and takes its
/// size from the host each frame. A view nested inside another view's subtree
/// gets a fresh pipeline adopted by the enclosing one, and must be given a
/// `size` since nothing lays it out from above.
#[derive(Debug, Default, Clone)]
pub struct View {
    pub key: Option<Key>,
    pub size: Option<Size>,
    pub child: Option<WidgetRef>,
}

impl View {
    pub fn new(child: WidgetRef) -> Self {
        Self {
            key: None,
            size: None,
            child: Some(child),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Widget for View {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::View(self)
    }
}
