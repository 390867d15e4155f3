pub mod check;
mod command_result;
pub mod helper;
pub mod init;
pub mod lookup;
pub mod release;
pub mod translate;
pub mod update;

pub use command_result::*;
