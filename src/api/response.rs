//! Response envelope.
//!
//! Every endpoint answers `{"success": true, "data": ...}` or
//! `{"success": false, "message": ...}`. Clients treat `success: false` as
//! recoverable: show the message, keep the page usable.

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({"success": true, "data": data}))
}

pub fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({"success": true, "message": message}))
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(json!({"success": true, "data": data}))
}

pub fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({"success": false, "message": message}))
}

pub fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({"success": false, "message": message}))
}

pub fn conflict(message: &str) -> HttpResponse {
    HttpResponse::Conflict().json(json!({"success": false, "message": message}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_wraps_data() {
        let resp = ok(vec![1, 2, 3]);
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }

    #[test]
    fn test_failure_envelope_statuses() {
        assert_eq!(bad_request("x").status().as_u16(), 400);
        assert_eq!(not_found("x").status().as_u16(), 404);
        assert_eq!(conflict("x").status().as_u16(), 409);
    }
}
