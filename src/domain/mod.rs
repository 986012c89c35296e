// Domain layer: models, the field schema and the ports the pipeline talks through.

pub mod model;
pub mod ports;
pub mod schema;
