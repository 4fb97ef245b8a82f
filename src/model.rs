//! Client-side entities and the wire envelopes they arrive in.

use serde::{Deserialize, Serialize};

/// A course as listed by `/courses` and referenced from a profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Course {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

pub type CourseRef = Course;

/// The signed-in user. Tutor-only fields are absent for plain users.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: String,
    /// Present only when the backend answers with a tutor record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutoring: Option<Vec<CourseRef>>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.firstname, self.lastname);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Tutors alone can change their bio and availability
    pub fn is_tutor(&self) -> bool {
        self.rating.is_some()
    }

    #[cfg(test)]
    pub fn is_tutoring(&self, code: &str) -> bool {
        self.tutoring
            .as_ref()
            .is_some_and(|courses| courses.iter().any(|c| c.code == code))
    }

    /// Merge a successful partial update into this profile
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(v) = &patch.firstname {
            self.firstname = v.clone();
        }
        if let Some(v) = &patch.lastname {
            self.lastname = v.clone();
        }
        if let Some(v) = &patch.email {
            self.email = v.clone();
        }
        if let Some(v) = &patch.phone {
            self.phone = v.clone();
        }
        if let Some(v) = &patch.bio {
            self.bio = v.clone();
        }
        if let Some(v) = &patch.availability {
            self.availability = split_availability(v);
        }
    }

    /// Record that this profile started or stopped tutoring a course
    pub fn apply_tutoring(&mut self, course: &CourseRef, action: bool) {
        let courses = self.tutoring.get_or_insert_with(Vec::new);
        if action {
            if !courses.iter().any(|c| c.code == course.code) {
                courses.push(course.clone());
                courses.sort_by(|a, b| a.code.cmp(&b.code));
            }
        } else {
            courses.retain(|c| c.code != course.code);
        }
    }
}

/// A profile as it appears on a course roster
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Tutor {
    pub username: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub availability: Vec<String>,
}

impl Tutor {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.firstname, self.lastname);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl From<&Profile> for Tutor {
    fn from(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            firstname: profile.firstname.clone(),
            lastname: profile.lastname.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            bio: profile.bio.clone(),
            rating: profile.rating.unwrap_or_default(),
            availability: profile.availability.clone(),
        }
    }
}

/// `GET /profile`. The canonical key is `user`; the backend also answers
/// with `profile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionEnvelope {
    #[serde(default, alias = "profile")]
    pub user: Option<Profile>,
}

/// `GET /courses`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursesEnvelope {
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// `GET /courses/:code`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CourseDetail {
    pub course: Course,
    #[serde(default)]
    pub tutors: Vec<Tutor>,
}

/// `GET /tutors/:username`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TutorDetail {
    pub tutor: Tutor,
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// One entry of the `tutoring` list in a profile PATCH.
/// `action = true` registers as tutor, `false` unregisters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TutoringChange {
    pub code: String,
    pub action: bool,
}

/// Body of `PATCH /profile`. Unset fields are omitted from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutoring: Option<Vec<TutoringChange>>,
}

impl ProfilePatch {
    pub fn tutoring(code: &str, action: bool) -> Self {
        Self {
            tutoring: Some(vec![TutoringChange {
                code: code.to_string(),
                action,
            }]),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `POST /signin` and `POST /signup`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Availability travels as one comma separated string in a PATCH
pub fn split_availability(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|day| !day.is_empty())
        .map(str::to_string)
        .collect()
}
