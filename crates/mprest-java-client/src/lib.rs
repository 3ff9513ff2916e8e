pub mod emitters;
pub mod generator;
pub mod type_mapper;

pub use generator::MicroProfileClientGenerator;
