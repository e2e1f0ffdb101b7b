// Domain layer - Plain data, no I/O
pub mod chart;
pub mod prediction;
pub mod readings;
pub mod sensor;
