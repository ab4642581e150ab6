// TUI components
//
// Each component renders one region of the screen and takes its data as
// arguments rather than reaching into App.

pub mod logs_panel;
pub mod preview;
pub mod status_bar;
pub mod title_bar;
pub mod toast;
