use std::fmt;
use std::rc::Rc;

use crate::context::BuildContext;
use crate::key::Key;
use crate::widget::{ProxyWidget, StatelessWidget, Widget, WidgetKind, WidgetRef};

/// Attaches a key to a subtree whose root widget has none.
#[derive(Debug, Clone)]
pub struct KeyedSubtree {
    pub key: Key,
    pub child: WidgetRef,
}

impl KeyedSubtree {
    pub fn new(key: impl Into<Key>, child: WidgetRef) -> Self {
        Self {
            key: key.into(),
            child,
        }
    }
}

impl Widget for KeyedSubtree {
    fn key(&self) -> Option<&Key> {
        Some(&self.key)
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Proxy(self)
    }
}

impl ProxyWidget for KeyedSubtree {
    fn child(&self) -> &WidgetRef {
        &self.child
    }
}

type BuildFn = dyn Fn(&mut BuildContext<'_>) -> WidgetRef;

/// Stateless widget whose `build` is a closure.
#[derive(Clone)]
pub struct Builder {
    pub key: Option<Key>,
    build: Rc<BuildFn>,
}

impl Builder {
    pub fn new(build: impl Fn(&mut BuildContext<'_>) -> WidgetRef + 'static) -> Self {
        Self {
            key: None,
            build: Rc::new(build),
        }
    }

    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder").field("key", &self.key).finish_non_exhaustive()
    }
}

impl Widget for Builder {
    fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Stateless(self)
    }
}

impl StatelessWidget for Builder {
    fn build(&self, cx: &mut BuildContext<'_>) -> WidgetRef {
        (self.build)(cx)
    }
}
