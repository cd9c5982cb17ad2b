// Domain layer - Core types, rules and error taxonomy

pub mod errors;
pub mod model;
pub mod rules;
