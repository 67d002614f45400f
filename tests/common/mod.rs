pub mod graphs;
pub mod ticknet;
