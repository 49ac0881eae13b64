pub mod doctor;
pub mod history;
pub mod location;
pub mod rating;
