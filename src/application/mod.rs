// Application layer - Use cases over the run data
pub mod decision_service;
pub mod run_repository;
