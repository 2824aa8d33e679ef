pub mod quad_repository;
pub mod term_repository;
