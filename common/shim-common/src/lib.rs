pub mod frontend;
pub mod num;
