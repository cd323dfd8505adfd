pub mod attribute_value;
pub mod image;
pub mod model;
pub mod product;
