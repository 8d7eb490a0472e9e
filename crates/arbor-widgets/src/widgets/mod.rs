//! Widget catalog built on the framework's capability traits.

mod animated;
mod basic;
mod builder;
mod flex;
mod pointer;

pub use animated::{AnimatedOpacity, AnimatedOpacityState, AnimatedPadding, AnimatedPaddingState};
pub use basic::{ClipRect, ColoredBox, ConstrainedBox, Fill, Opacity, Padding, SizedBox};
pub use builder::{Builder, KeyedSubtree};
pub use flex::{Flex, Flexible};
pub use pointer::{
    PointerEvent, PointerEventKind, PointerHandler, PointerListener, RenderPointerListener,
};

#[cfg(test)]
#[path = "../tests/catalog_tests.rs"]
mod tests;
