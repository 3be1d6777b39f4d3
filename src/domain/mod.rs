// Domain layer - chiller plant readings and the physics engine
pub mod chiller;
pub mod dataset;
pub mod decision;
pub mod model_error;
pub mod physics_model;
pub mod report;
pub mod timestep;
pub mod validation;
