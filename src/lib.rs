pub mod bands;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod geo;
pub mod output;
pub mod properties;
pub mod stats;
pub mod stops;
