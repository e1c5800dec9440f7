pub mod init;
pub mod render;
pub mod run;
pub mod tools;
pub mod utils;
