pub mod format;
pub mod list_navigation;
pub mod path;
pub mod text_input;

pub use format::{format_date, format_price, format_time};
pub use list_navigation::{ListStateExt, DEFAULT_PAGE_SIZE};
pub use path::{get_config_dir, get_config_path, get_log_dir, get_log_path, get_session_path};
pub use text_input::TextInput;
