pub mod address;
pub mod education;
pub mod employee;
pub mod employee_image;
pub mod permission;
pub mod request;
pub mod role;
pub mod team;
