// Shared UI pieces drawn around and on top of the screens

pub mod footer;
pub mod header;
pub mod help_overlay;
pub mod tab_bar;

pub use footer::Footer;
pub use header::Header;
pub use help_overlay::HelpOverlay;
pub use tab_bar::TabBar;
