//! Render-object tree for Arbor: layout with relayout boundaries, per-node
//! paint caching, and the pipeline owner that flushes both.

pub mod collections;
mod display_list;
mod frame_callbacks;
mod object;
pub mod objects;
mod pipeline;
mod renderer;
mod tree;

pub use display_list::{
    DisplayList, DisplayListBuilder, DisplayListHandle, DrawCommand, ScenePrimitive,
};
pub use frame_callbacks::{FrameCallback, FrameCallbacks};
pub use hit_test::{HitTestEntry, HitTestResult};
pub use object::{AsAny, FlexFit, HitTestBehavior, Invalidation, ParentData, RenderObject};
pub use pipeline::{FlushStats, PipelineId, PipelineOwner};
pub use renderer::{PaintCx, Renderer};
pub use tree::{ChildIter, LayoutCx, RenderChildren, RenderId, RenderTree, TreeError};

pub use arbor_geometry as geometry;
