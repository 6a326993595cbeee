pub mod calibration;
pub mod combinations;
pub mod dixon_coles;
pub mod edge;
pub mod elo;
pub mod error;
pub mod fixture;
pub mod goal_rate;
pub mod logging;
pub mod market;
pub mod model_config;
pub mod persist;
pub mod predict;
pub mod report;
pub mod secondary;
