pub mod init;
pub mod plot;
pub mod run;
pub mod validate;
