// Domain layer - Core naming rules and value types

pub mod model;
pub mod rules;
