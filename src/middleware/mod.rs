pub mod check_email;

pub use check_email::UniqueEmail;
