pub mod models;
pub mod pg_repository;
