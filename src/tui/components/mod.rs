// Components module - reusable UI building blocks
//
// Shell components are rendered around every page:
// - Title bar: app name, route title, login state
// - Status bar: current URL and key hints
// - Logs panel: captured tracing output (toggle with L)

pub mod logs_panel;
pub mod scrollbar;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;
