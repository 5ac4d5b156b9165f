//! Controladores
//!
//! Orquestan permisos, validación y almacén para cada endpoint.

pub mod assignment_controller;
pub mod auth_controller;
pub mod fleet_controller;
pub mod tracking_controller;
