//! Seguimiento en vivo de los buses del campus
//!
//! Los conductores envían su posición, el administrador asigna buses y
//! cualquiera consulta la flota para el mapa.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
