mod canvas_panel;
mod popups;
mod toolbar;

pub use canvas_panel::{canvas_panel, context_menu};
pub use popups::popups;
pub use toolbar::toolbar;
