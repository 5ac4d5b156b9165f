//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de coordenadas recibidas de los clientes.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use validator::ValidationError;

use crate::utils::errors::AppError;

lazy_static! {
    static ref BUS_TAG_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _-]{0,19}$")
        .expect("bus tag regex is valid");
}

/// Validar formato de etiqueta de bus (p. ej. "B12", "Shuttle-3")
pub fn validate_bus_tag(value: &str) -> Result<(), ValidationError> {
    if !BUS_TAG_REGEX.is_match(value) {
        let mut error = ValidationError::new("bus_tag");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"1-20 letters, digits, spaces, '-' or '_'".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de coordenadas GPS
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&lat) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &lat);
        error.add_param("range".into(), &"-90.0 to 90.0".to_string());
        return Err(error);
    }

    if !(-180.0..=180.0).contains(&lng) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &lng);
        error.add_param("range".into(), &"-180.0 to 180.0".to_string());
        return Err(error);
    }

    Ok(())
}

/// Convertir un campo de coordenada del cuerpo JSON a `f64`.
///
/// Acepta números JSON y strings numéricos ("6.67"), como hacen los
/// clientes móviles que serializan desde campos de formulario.
pub fn parse_coordinate(value: Option<&Value>, field: &str) -> Result<f64, AppError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(AppError::missing_field("Missing coordinates")),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::bad_value(format!("{} must be a number", field))),
    }
}

/// Decodificar el cuerpo crudo de un envío. Vacío cuenta como coordenadas
/// ausentes; JSON mal formado es un valor inválido.
pub fn parse_json_body(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::missing_field("Missing coordinates"));
    }
    serde_json::from_slice(body).map_err(|_| AppError::bad_value("Body is not valid JSON"))
}

/// Leer y validar el par (latitud, longitud) de un cuerpo JSON
pub fn parse_position(body: &Value, enforce_bounds: bool) -> Result<(f64, f64), AppError> {
    let raw_lat = body.get("latitude");
    let raw_lon = body.get("longitude");
    if raw_lat.map_or(true, Value::is_null) || raw_lon.map_or(true, Value::is_null) {
        return Err(AppError::missing_field("Missing coordinates"));
    }

    let lat = parse_coordinate(raw_lat, "latitude")?;
    let lon = parse_coordinate(raw_lon, "longitude")?;
    check_bounds(lat, lon, enforce_bounds)?;
    Ok((lat, lon))
}

/// Rechazar posiciones fuera de [-90, 90] x [-180, 180] si así está configurado
pub fn check_bounds(lat: f64, lon: f64, enforce_bounds: bool) -> Result<(), AppError> {
    if !(lat.is_finite() && lon.is_finite()) {
        return Err(AppError::bad_value("coordinates must be finite numbers"));
    }
    if enforce_bounds {
        validate_coordinates(lat, lon).map_err(|e| {
            AppError::out_of_range(format!("{} out of range", e.code))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::InputErrorKind;
    use serde_json::json;

    fn kind_of(err: AppError) -> InputErrorKind {
        match err {
            AppError::Input { kind, .. } => kind,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_body() {
        assert_eq!(kind_of(parse_json_body(b"  ").unwrap_err()), InputErrorKind::MissingField);
        assert_eq!(kind_of(parse_json_body(b"{lat").unwrap_err()), InputErrorKind::BadValue);

        let value = parse_json_body(br#"{"latitude": 6.7}"#).unwrap();
        assert_eq!(value["latitude"], 6.7);
    }

    #[test]
    fn test_validate_bus_tag() {
        assert!(validate_bus_tag("B12").is_ok());
        assert!(validate_bus_tag("Shuttle-3 North").is_ok());
        assert!(validate_bus_tag("").is_err());
        assert!(validate_bus_tag(" B12").is_err());
        assert!(validate_bus_tag(&"B".repeat(21)).is_err());
        assert!(validate_bus_tag("B12;DROP").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(6.67, -1.56).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(91.0, -75.0).is_err());
        assert!(validate_coordinates(45.0, -181.0).is_err());
    }

    #[test]
    fn test_parse_position_accepts_numbers_and_numeric_strings() {
        let body = json!({ "latitude": 6.675, "longitude": "-1.571" });
        assert_eq!(parse_position(&body, true).unwrap(), (6.675, -1.571));
    }

    #[test]
    fn test_parse_position_missing_field() {
        let body = json!({ "latitude": 6.675 });
        assert_eq!(kind_of(parse_position(&body, true).unwrap_err()), InputErrorKind::MissingField);

        let body = json!({ "latitude": null, "longitude": 1.0 });
        assert_eq!(kind_of(parse_position(&body, true).unwrap_err()), InputErrorKind::MissingField);
    }

    #[test]
    fn test_parse_position_bad_value() {
        let body = json!({ "latitude": "north", "longitude": 1.0 });
        assert_eq!(kind_of(parse_position(&body, true).unwrap_err()), InputErrorKind::BadValue);

        let body = json!({ "latitude": [1], "longitude": 1.0 });
        assert_eq!(kind_of(parse_position(&body, true).unwrap_err()), InputErrorKind::BadValue);

        let body = json!({ "latitude": "NaN", "longitude": 1.0 });
        assert_eq!(kind_of(parse_position(&body, true).unwrap_err()), InputErrorKind::BadValue);
    }

    #[test]
    fn test_parse_position_bounds_are_configurable() {
        let body = json!({ "latitude": 120.0, "longitude": 1.0 });
        assert_eq!(kind_of(parse_position(&body, true).unwrap_err()), InputErrorKind::OutOfRange);
        assert_eq!(parse_position(&body, false).unwrap(), (120.0, 1.0));
    }
}
