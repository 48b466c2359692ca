// Application layer - Use cases over the monitoring services
pub mod device_service;
pub mod metric_filter;
pub mod metrics_service;
pub mod monitoring_repository;
pub mod normalizer;
pub mod query_orchestrator;
