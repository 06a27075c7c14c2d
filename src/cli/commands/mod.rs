pub mod clean;
pub mod compact;
pub mod helper;
pub mod init;
pub mod pipeline;
