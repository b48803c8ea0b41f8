pub mod compare;
pub mod grade;
pub mod init;
pub mod judge;
pub mod normalize;
pub mod validate;
