pub mod system;
pub mod picture;
pub mod widget;
