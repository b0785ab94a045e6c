// Application layer - Use cases and data-access seams
pub mod device_gateway;
pub mod fetch_service;
