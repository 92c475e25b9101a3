mod layout;

pub use layout::render;
