//! Wire DTOs for the hosted auth and REST backends.
//!
//! DESIGN
//! ======
//! Provider records (`ProviderUser`, `Session`) mirror the auth service's JSON
//! so they deserialize directly; the app-facing `User` is derived from them
//! and never persisted. School rows tolerate missing columns so partial
//! selects (`select=id,name,city,state`) decode into the same type.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Application role carried in the provider's user metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    SchoolOwner,
    Admin,
}

impl Role {
    /// Parse a metadata role string; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "school_owner" => Some(Self::SchoolOwner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::SchoolOwner => "school_owner",
            Self::Admin => "admin",
        }
    }
}

/// The signed-in user as the UI sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl User {
    /// Name for menus and greetings; `"User"` when no name is set.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { "User" } else { &self.name }
    }

    /// Avatar initial: first letter of the name, else of the email.
    pub fn initial(&self) -> Option<char> {
        self.name
            .chars()
            .next()
            .or_else(|| self.email.chars().next())
            .and_then(|c| c.to_uppercase().next())
    }

    /// Whether the owner dashboard should be offered.
    pub fn can_manage_schools(&self) -> bool {
        matches!(self.role, Role::SchoolOwner | Role::Admin)
    }
}

/// User record as returned by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl ProviderUser {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(serde_json::Value::as_str)
    }

    /// Map into the app-facing user shape.
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone().unwrap_or_default(),
            name: self.metadata_str("full_name").unwrap_or_default().to_owned(),
            role: self.metadata_str("role").and_then(Role::parse).unwrap_or_default(),
        }
    }
}

/// An authenticated provider session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry in seconds since the Unix epoch.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: ProviderUser,
}

/// Kinds of session-change notifications the provider emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// One session-change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

/// OAuth providers offered on the login screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

/// Metadata attached to new accounts at signup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub role: Role,
}

/// A school listing row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct School {
    pub id: String,
    pub place_id: Option<String>,
    pub owner_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub featured_image: Option<String>,
    pub link: Option<String>,
    pub schedule_image: Option<String>,
    pub is_premium: bool,
    pub premium_until: Option<String>,
    pub is_lifetime: bool,

    pub has_gi: Option<bool>,
    pub has_nogi: Option<bool>,
    pub has_kids: Option<bool>,
    pub has_showers: Option<bool>,
    pub has_open_mat: Option<bool>,
    pub has_competition_training: Option<bool>,
    pub has_womens_only_classes: Option<bool>,
    pub has_beginner_classes: Option<bool>,
    pub has_morning_classes: Option<bool>,
    pub has_evening_classes: Option<bool>,
    pub has_weekend_classes: Option<bool>,
    pub has_weight_room: Option<bool>,
    pub has_laundry: Option<bool>,
    pub has_air_conditioning: Option<bool>,

    /// Weekly timetable keyed by day name.
    pub schedule: Option<BTreeMap<String, Vec<ClassSession>>>,
    pub programs: Option<Vec<Program>>,
    pub instructors: Option<Vec<Instructor>>,
    pub gallery: Option<Vec<GalleryImage>>,
    pub youtube_videos: Option<Vec<YouTubeVideo>>,
}

impl School {
    pub fn city_str(&self) -> &str {
        self.city.as_deref().unwrap_or_default()
    }

    pub fn state_str(&self) -> &str {
        self.state.as_deref().unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub credentials: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub start_time: String,
    pub end_time: String,
    pub class_name: String,
    #[serde(default)]
    pub instructor: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubeVideo {
    pub id: String,
    pub youtube_id: String,
    #[serde(default)]
    pub title: String,
}

/// Scalar school fields edited by the owner form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolDraft {
    pub name: String,
    pub description: String,
    pub website: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub has_gi: bool,
    pub has_nogi: bool,
    pub has_kids: bool,
    pub has_showers: bool,
    pub has_open_mat: bool,
}

impl From<&School> for SchoolDraft {
    fn from(school: &School) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: school.name.clone(),
            description: text(&school.description),
            website: text(&school.website),
            phone: text(&school.phone),
            address: text(&school.address),
            city: text(&school.city),
            state: text(&school.state),
            zipcode: text(&school.zipcode),
            has_gi: school.has_gi.unwrap_or(false),
            has_nogi: school.has_nogi.unwrap_or(false),
            has_kids: school.has_kids.unwrap_or(false),
            has_showers: school.has_showers.unwrap_or(false),
            has_open_mat: school.has_open_mat.unwrap_or(false),
        }
    }
}
