//! Element arena types.

use std::fmt;

use arbor_render::{PipelineId, RenderId};
use slotmap::new_key_type;

use crate::collections::HashSet;
use crate::widget::{AnyState, WidgetRef};

new_key_type! {
    /// Handle to an element in a [`Framework`](crate::Framework).
    pub struct ElementId;
}

/// `Initial -> Active <-> Inactive -> Defunct`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Initial,
    Active,
    Inactive,
    Defunct,
}

/// Position of a child within its parent. `previous` is the preceding sibling
/// in a child list and routes render-object insertion order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub previous: Option<ElementId>,
}

impl Slot {
    pub const FIRST: Slot = Slot {
        index: 0,
        previous: None,
    };

    pub fn new(index: usize, previous: Option<ElementId>) -> Self {
        Self { index, previous }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    Missing {
        id: ElementId,
    },
    NotStateful {
        id: ElementId,
    },
    StateMismatch {
        id: ElementId,
        expected: &'static str,
    },
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementError::Missing { id } => write!(f, "element {id:?} missing"),
            ElementError::NotStateful { id } => write!(f, "element {id:?} has no state"),
            ElementError::StateMismatch { id, expected } => {
                write!(f, "state of element {id:?} is not a {expected}")
            }
        }
    }
}

impl std::error::Error for ElementError {}

pub(crate) struct ElementNode {
    pub(crate) widget: WidgetRef,
    pub(crate) parent: Option<ElementId>,
    pub(crate) depth: usize,
    pub(crate) slot: Slot,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) dirty: bool,
    pub(crate) in_dirty_list: bool,
    /// Pipeline whose tree holds this element's render object, or the
    /// render objects of its descendants for components.
    pub(crate) pipeline: PipelineId,
    pub(crate) kind: ElementKind,
}

pub(crate) enum ElementKind {
    /// Stateless, stateful, and proxy widgets. No render object of their own.
    Component {
        child: Option<ElementId>,
        state: Option<Box<dyn AnyState>>,
    },
    LeafRender {
        render: RenderId,
    },
    SingleChildRender {
        render: RenderId,
        child: Option<ElementId>,
    },
    MultiChildRender {
        render: RenderId,
        children: Vec<ElementId>,
        /// Children removed by a global-key retake during the current build.
        forgotten: HashSet<ElementId>,
    },
    View {
        render: RenderId,
        child: Option<ElementId>,
        /// Pipeline that adopted this view's own pipeline. `None` for the root view.
        enclosing: Option<PipelineId>,
    },
}

impl ElementKind {
    pub(crate) fn render(&self) -> Option<RenderId> {
        match self {
            ElementKind::Component { .. } => None,
            ElementKind::LeafRender { render }
            | ElementKind::SingleChildRender { render, .. }
            | ElementKind::MultiChildRender { render, .. }
            | ElementKind::View { render, .. } => Some(*render),
        }
    }

    pub(crate) fn children(&self) -> Vec<ElementId> {
        match self {
            ElementKind::Component { child, .. }
            | ElementKind::SingleChildRender { child, .. }
            | ElementKind::View { child, .. } => child.iter().copied().collect(),
            ElementKind::LeafRender { .. } => Vec::new(),
            ElementKind::MultiChildRender { children, .. } => children.clone(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            ElementKind::Component { state: Some(_), .. } => "StatefulElement",
            ElementKind::Component { .. } => "ComponentElement",
            ElementKind::LeafRender { .. } => "LeafRenderElement",
            ElementKind::SingleChildRender { .. } => "SingleChildRenderElement",
            ElementKind::MultiChildRender { .. } => "MultiChildRenderElement",
            ElementKind::View { .. } => "ViewElement",
        }
    }
}

/// Element counts since the framework was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElementStats {
    pub created: usize,
    pub rebuilt: usize,
    pub updated: usize,
    pub deactivated: usize,
    pub unmounted: usize,
}
