pub mod blanks;
pub mod health;
pub mod init;
pub mod practice;
pub mod validate;
