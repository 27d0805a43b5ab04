pub mod handlers;
pub mod notices;
pub mod preview_area;
pub mod results;
pub mod upload_section;
pub mod utils;
