//! Structural validation of producer input. All violations are collected;
//! nothing here short-circuits or touches state.

use chrono::{DateTime, Utc};
use jlip_core::JobDto;
use serde::{Deserialize, Serialize};

pub const TITLE_REQUIRED: &str = "TITLE_REQUIRED";
pub const COMPANY_REQUIRED: &str = "COMPANY_REQUIRED";
pub const LOCATION_REQUIRED: &str = "LOCATION_REQUIRED";
pub const POSTED_AT_REQUIRED: &str = "POSTED_AT_REQUIRED";
pub const POSTED_AT_FUTURE: &str = "POSTED_AT_FUTURE";
pub const SALARY_RANGE_INVALID: &str = "SALARY_RANGE_INVALID";
pub const EXPIRES_AT_LT_POSTED: &str = "EXPIRES_AT_LT_POSTED";

/// One structural problem with a DTO, addressed to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub field: String,
}

impl ValidationIssue {
    fn new(code: &str, message: impl Into<String>, field: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: field.to_string(),
        }
    }
}

/// Check a DTO against the structural rules. Returns every violation at
/// once so a producer can fix its payload in a single round trip.
pub fn validate(dto: &JobDto, now: DateTime<Utc>) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if dto.title.trim().is_empty() {
        issues.push(ValidationIssue::new(
            TITLE_REQUIRED,
            "title must be non-empty",
            "title",
        ));
    }

    if dto.company.name.trim().is_empty() {
        issues.push(ValidationIssue::new(
            COMPANY_REQUIRED,
            "company.name must be present",
            "company.name",
        ));
    }

    let has_country = dto
        .location
        .country
        .as_deref()
        .map(|c| !c.trim().is_empty())
        .unwrap_or(false);
    if !has_country && dto.location.remote_type.is_none() {
        issues.push(ValidationIssue::new(
            LOCATION_REQUIRED,
            "location.country or location.remote_type must be present",
            "location",
        ));
    }

    match dto.posted_at {
        None => issues.push(ValidationIssue::new(
            POSTED_AT_REQUIRED,
            "posted_at must be present",
            "posted_at",
        )),
        Some(posted_at) => {
            if posted_at > now {
                issues.push(ValidationIssue::new(
                    POSTED_AT_FUTURE,
                    "posted_at must not be in the future",
                    "posted_at",
                ));
            }
            if let Some(expires_at) = dto.expires_at {
                if expires_at < posted_at {
                    issues.push(ValidationIssue::new(
                        EXPIRES_AT_LT_POSTED,
                        "expires_at must not precede posted_at",
                        "expires_at",
                    ));
                }
            }
        }
    }

    if let Some(salary) = &dto.salary {
        if let (Some(min), Some(max)) = (salary.min, salary.max) {
            if min > max {
                issues.push(ValidationIssue::new(
                    SALARY_RANGE_INVALID,
                    "salary.min must not exceed salary.max",
                    "salary",
                ));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
