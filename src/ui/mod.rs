pub mod console;
pub mod traits;

pub use console::ConsoleSurface;
pub use traits::UiSurface;
