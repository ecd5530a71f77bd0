// Screen identifiers and the rendering-side interface the controller
// drives. Widget building and layout live with the render path.

mod scene;

pub use scene::{Scene, ScreenId};
