//! Analysis session domain types and request validation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

pub const MAX_COMPETITORS: usize = 3;
pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_NAME_CHARS: usize = 255;
pub const MAX_HANDLE_CHARS: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "running" => Ok(SessionStatus::Running),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandRole {
    Focus,
    Competitor,
}

impl BrandRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BrandRole::Focus => "focus",
            BrandRole::Competitor => "competitor",
        }
    }
}

impl std::fmt::Display for BrandRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrandRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(BrandRole::Focus),
            "competitor" => Ok(BrandRole::Competitor),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

/// Social platforms a brand can be tracked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Tiktok,
    Twitter,
    Youtube,
    Facebook,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::Tiktok,
        Platform::Twitter,
        Platform::Youtube,
        Platform::Facebook,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Twitter => "twitter",
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
        }
    }

    /// Human-readable label for document headings and chart axes.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::Tiktok => "TikTok",
            Platform::Twitter => "Twitter / X",
            Platform::Youtube => "YouTube",
            Platform::Facebook => "Facebook",
        }
    }

    /// Label for a platform key that may not be one of the known platforms.
    #[must_use]
    pub fn label_for(key: &str) -> String {
        key.parse::<Platform>()
            .map_or_else(|()| key.to_string(), |p| p.label().to_string())
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::Tiktok),
            "twitter" | "x" => Ok(Platform::Twitter),
            "youtube" | "yt" => Ok(Platform::Youtube),
            "facebook" | "fb" => Ok(Platform::Facebook),
            _ => Err(()),
        }
    }
}

/// A brand as submitted when creating a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandInput {
    pub name: String,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
}

impl BrandInput {
    /// Handle for `platform`, if one was supplied.
    #[must_use]
    pub fn handle(&self, platform: Platform) -> Option<&str> {
        let value = match platform {
            Platform::Instagram => &self.instagram,
            Platform::Tiktok => &self.tiktok,
            Platform::Twitter => &self.twitter,
            Platform::Youtube => &self.youtube,
            Platform::Facebook => &self.facebook,
        };
        value.as_deref()
    }

    /// Trim every field and drop empty optional strings.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };
        Self {
            name: self.name.trim().to_string(),
            website: clean(&self.website),
            instagram: clean(&self.instagram),
            tiktok: clean(&self.tiktok),
            twitter: clean(&self.twitter),
            youtube: clean(&self.youtube),
            facebook: clean(&self.facebook),
        }
    }

    fn validate_into(&self, prefix: &str, violations: &mut Vec<FieldViolation>) {
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_CHARS {
            violations.push(FieldViolation::new(
                format!("{prefix}.name"),
                format!("must be 1–{MAX_NAME_CHARS} characters"),
            ));
        }
        if let Some(website) = &self.website {
            let valid = url::Url::parse(website)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
                .unwrap_or(false);
            if !valid {
                violations.push(FieldViolation::new(
                    format!("{prefix}.website"),
                    format!("must be a valid http(s) URL, got '{website}'"),
                ));
            }
        }
        for platform in Platform::ALL {
            if let Some(handle) = self.handle(platform) {
                if handle.chars().count() > MAX_HANDLE_CHARS {
                    violations.push(FieldViolation::new(
                        format!("{prefix}.{}", platform.as_str()),
                        format!("must be at most {MAX_HANDLE_CHARS} characters"),
                    ));
                }
            }
        }
    }
}

/// Body of a session-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub title: String,
    #[serde(default)]
    pub universe_keywords: Option<String>,
    pub focus_brand: BrandInput,
    #[serde(default)]
    pub competitors: Vec<BrandInput>,
}

/// A single failed validation rule, reported back to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl NewSession {
    /// Trim and normalize the request, then validate every rule.
    ///
    /// Returns the normalized request, or every violation found (not just the
    /// first) so clients can show all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the list of [`FieldViolation`]s when any rule fails.
    pub fn validated(&self) -> Result<NewSession, Vec<FieldViolation>> {
        let normalized = NewSession {
            title: self.title.trim().to_string(),
            universe_keywords: self
                .universe_keywords
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned),
            focus_brand: self.focus_brand.normalized(),
            competitors: self.competitors.iter().map(BrandInput::normalized).collect(),
        };

        let mut violations = Vec::new();
        let title_len = normalized.title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_CHARS {
            violations.push(FieldViolation::new(
                "title",
                format!("must be 1–{MAX_TITLE_CHARS} characters"),
            ));
        }
        normalized
            .focus_brand
            .validate_into("focus_brand", &mut violations);
        if normalized.competitors.len() > MAX_COMPETITORS {
            violations.push(FieldViolation::new(
                "competitors",
                format!("at most {MAX_COMPETITORS} competitors are allowed"),
            ));
        }
        for (i, competitor) in normalized.competitors.iter().enumerate() {
            competitor.validate_into(&format!("competitors[{i}]"), &mut violations);
        }

        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str) -> BrandInput {
        BrandInput {
            name: name.to_string(),
            ..BrandInput::default()
        }
    }

    fn session(title: &str) -> NewSession {
        NewSession {
            title: title.to_string(),
            universe_keywords: None,
            focus_brand: brand("Acme"),
            competitors: vec![],
        }
    }

    #[test]
    fn valid_session_passes_and_is_trimmed() {
        let mut req = session("  Q3 benchmark  ");
        req.focus_brand.instagram = Some("  @acme ".to_string());
        req.focus_brand.tiktok = Some("   ".to_string());
        let ok = req.validated().expect("valid");
        assert_eq!(ok.title, "Q3 benchmark");
        assert_eq!(ok.focus_brand.instagram.as_deref(), Some("@acme"));
        assert!(ok.focus_brand.tiktok.is_none());
    }

    #[test]
    fn empty_title_is_rejected() {
        let errs = session("   ").validated().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "title");
    }

    #[test]
    fn overlong_title_is_rejected() {
        let errs = session(&"x".repeat(256)).validated().unwrap_err();
        assert_eq!(errs[0].field, "title");
        assert!(session(&"x".repeat(255)).validated().is_ok());
    }

    #[test]
    fn more_than_three_competitors_is_rejected() {
        let mut req = session("Benchmark");
        req.competitors = vec![brand("A"), brand("B"), brand("C"), brand("D")];
        let errs = req.validated().unwrap_err();
        assert!(errs.iter().any(|e| e.field == "competitors"));
    }

    #[test]
    fn bad_website_reports_field_path() {
        let mut req = session("Benchmark");
        req.competitors = vec![BrandInput {
            name: "Globex".to_string(),
            website: Some("not a url".to_string()),
            ..BrandInput::default()
        }];
        let errs = req.validated().unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].field, "competitors[0].website");
    }

    #[test]
    fn non_http_website_is_rejected() {
        let mut req = session("Benchmark");
        req.focus_brand.website = Some("ftp://acme.example".to_string());
        let errs = req.validated().unwrap_err();
        assert_eq!(errs[0].field, "focus_brand.website");
    }

    #[test]
    fn collects_every_violation() {
        let mut req = session("");
        req.focus_brand.name = String::new();
        let errs = req.validated().unwrap_err();
        let fields: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "focus_brand.name"]);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Running,
            SessionStatus::Completed,
            SessionStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
        assert!("done".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn platform_parses_aliases_and_labels_unknown_keys() {
        assert_eq!("X".parse::<Platform>(), Ok(Platform::Twitter));
        assert_eq!(Platform::label_for("tiktok"), "TikTok");
        assert_eq!(Platform::label_for("threads"), "threads");
    }
}
