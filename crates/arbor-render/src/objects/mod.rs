//! Built-in render objects.

mod clip;
mod colored_box;
mod constrained;
mod fill;
mod flex;
mod opacity;
mod padding;
mod view;

pub use clip::RenderClipRect;
pub use colored_box::RenderColoredBox;
pub use constrained::RenderConstrainedBox;
pub use fill::RenderFill;
pub use flex::RenderFlex;
pub use opacity::RenderOpacity;
pub use padding::RenderPadding;
pub use view::RenderView;

#[cfg(test)]
#[path = "../tests/objects_tests.rs"]
mod tests;
