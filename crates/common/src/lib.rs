// rulebridge-common: rule document codec, activation model and editor transforms

pub mod activation;
pub mod aggregate;
pub mod editor;
pub mod frontmatter;
pub mod links;
pub mod path;
