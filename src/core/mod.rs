// Error modeling shared by every module.
pub mod error;
