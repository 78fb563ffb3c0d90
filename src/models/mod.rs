pub mod department;
pub mod floor;
pub mod hospital;
pub mod patient;
pub mod role;
pub mod staff;
pub mod user;
pub mod ward;
