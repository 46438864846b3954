mod central_panel;
mod previews_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use previews_panel::previews_panel;
pub use tools_panel::tools_panel;
