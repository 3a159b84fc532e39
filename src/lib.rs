pub mod apparent_place;
pub mod constants;
pub mod earth_orientation;
pub mod jpl_ephem;
pub mod moving_point;
pub mod observers;
pub mod ref_system;
pub mod refraction;
pub mod skyplace_errors;
pub mod stars;
pub mod time;
