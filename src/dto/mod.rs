//! DTOs de la API
//!
//! Cuerpos de request y response de los endpoints.

pub mod api_response;
pub mod auth_dto;
pub mod bus_dto;
