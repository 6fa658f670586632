// Domain layer: document models and ports (interfaces).

pub mod model;
pub mod ports;
