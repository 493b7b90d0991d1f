pub mod account;
pub mod otp;
pub mod payment;
pub mod resume;
