/*
 * Links the SQL tables to their models and exports them for ease of use.
*/

mod action;
pub use action::*;
mod image;
pub use image::*;
mod image_like;
pub use image_like::*;
mod user;
pub use user::*;
