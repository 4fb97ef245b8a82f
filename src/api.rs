//! Typed endpoints of the TutsVILLE backend, layered over [`RemoteCall`].

use crate::model::{
    CourseDetail, CoursesEnvelope, Credentials, Profile, ProfilePatch, SessionEnvelope,
    TutorDetail,
};
use crate::remote::{CallOptions, HttpError, Method, RemoteCall};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Characters allowed in a route parameter (course code, username)
static SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._~-]+$").unwrap());

pub fn valid_segment(segment: &str) -> bool {
    SEGMENT.is_match(segment)
}

fn segment(value: &str) -> Result<&str, HttpError> {
    if valid_segment(value) {
        Ok(value)
    } else {
        Err(HttpError::new(400, format!("Invalid path segment '{}'", value)))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, HttpError> {
    serde_json::from_value(value)
        .map_err(|e| HttpError::unexpected(format!("Unexpected response shape: {}", e)))
}

fn encode<T: Serialize>(body: &T) -> Result<String, HttpError> {
    serde_json::to_string(body)
        .map_err(|e| HttpError::unexpected(format!("Failed to encode request: {}", e)))
}

/// Session check. The backend answers 401 when nobody is signed in, which
/// is an ordinary outcome here rather than a failure.
pub fn fetch_session(remote: &dyn RemoteCall) -> Result<Option<Profile>, HttpError> {
    match remote.call("/profile", &CallOptions::get()) {
        Ok(value) => Ok(decode::<SessionEnvelope>(value)?.user),
        Err(e) if e.is_status(401) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn fetch_courses(remote: &dyn RemoteCall) -> Result<CoursesEnvelope, HttpError> {
    decode(remote.call("/courses", &CallOptions::get())?)
}

pub fn fetch_course(remote: &dyn RemoteCall, code: &str) -> Result<CourseDetail, HttpError> {
    let path = format!("/courses/{}", segment(code)?);
    decode(remote.call(&path, &CallOptions::get())?)
}

pub fn fetch_tutor(remote: &dyn RemoteCall, username: &str) -> Result<TutorDetail, HttpError> {
    let path = format!("/tutors/{}", segment(username)?);
    decode(remote.call(&path, &CallOptions::get())?)
}

/// `PATCH /profile` with a partial profile. The response body is not used.
pub fn patch_profile(remote: &dyn RemoteCall, patch: &ProfilePatch) -> Result<(), HttpError> {
    let options = CallOptions::with_body(Method::Patch, encode(patch)?);
    remote.call("/profile", &options)?;
    Ok(())
}

/// Register (`action = true`) or unregister as tutor for one course
pub fn set_tutoring(remote: &dyn RemoteCall, code: &str, action: bool) -> Result<(), HttpError> {
    patch_profile(remote, &ProfilePatch::tutoring(code, action))
}

pub fn sign_in(remote: &dyn RemoteCall, credentials: &Credentials) -> Result<(), HttpError> {
    let options = CallOptions::with_body(Method::Post, encode(credentials)?);
    remote.call("/signin", &options)?;
    Ok(())
}

pub fn sign_up(remote: &dyn RemoteCall, credentials: &Credentials) -> Result<(), HttpError> {
    let options = CallOptions::with_body(Method::Post, encode(credentials)?);
    remote.call("/signup", &options)?;
    Ok(())
}

pub fn sign_out(remote: &dyn RemoteCall) -> Result<(), HttpError> {
    let options = CallOptions::with_body(Method::Post, "{}".to_string());
    remote.call("/signout", &options)?;
    Ok(())
}
