mod normalize;

pub use normalize::{normalize_section_path, section_title, spaced, SectionPathError};
