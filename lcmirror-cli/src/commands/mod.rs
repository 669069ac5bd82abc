pub mod init;
pub mod login;
pub mod reset;
pub mod status;
pub mod sync;
