pub mod history;
pub mod home;
pub mod knowledge;
pub mod not_found;
