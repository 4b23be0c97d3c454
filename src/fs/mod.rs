//! Helpers layered on top of the backends: recursive directory operations, JSON documents,
//! temporary files and the executable location.

mod dir;
mod exec;
mod json;
mod temp;

pub use dir::{mkdir_all, remove_all};
pub use exec::ExecInfo;
pub use json::{load_json, save_json};
pub use temp::TempRoot;
