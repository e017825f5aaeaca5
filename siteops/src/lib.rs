pub mod backup;
pub mod batch;
pub mod cli;
pub mod codec;
pub mod document;
pub mod error;
pub mod html;
pub mod html_parser;
pub mod html_pass;
pub mod html_string;
pub mod manifest;
pub mod path_utils;
pub mod picture;
pub mod report;
pub mod tasks;

pub use error::{Error, Result};
