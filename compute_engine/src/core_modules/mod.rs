pub mod errors;
pub mod factorial;
pub mod fibonacci;
pub mod grayscale;
pub mod matrix;
pub mod numeric;
pub mod pixel;
pub mod prime;
pub mod sort;
pub mod word_frequency;
