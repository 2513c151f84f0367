//! The fill-or-improve merge policy: a field is overwritten only when the
//! stored value is absent or the incoming value is strictly more
//! informative. A later, thinner scrape never regresses an earlier,
//! richer one. Pure functions; the stores apply the result.

use chrono::{DateTime, Utc};
use jlip_core::{CanonicalJob, Seniority};

pub const FIELD_TITLE: &str = "title";
pub const FIELD_COMPANY: &str = "company";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_SALARY: &str = "salary";
pub const FIELD_SENIORITY: &str = "seniority";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_SANITIZED_DESCRIPTION: &str = "sanitized_description";
pub const FIELD_SKILLS: &str = "skills";
pub const FIELD_BENEFITS: &str = "benefits";
pub const FIELD_EXPIRES_AT: &str = "expires_at";
pub const FIELD_APPLICATION_COUNT: &str = "application_count";
pub const FIELD_REFERRAL_AVAILABLE: &str = "referral_available";
pub const FIELD_CANONICAL_URL: &str = "canonical_url";
pub const FIELD_EXTERNAL_ID: &str = "external_id";

/// Merge `incoming` into `existing`. Returns the merged record and the
/// names of visibly changed fields. `last_seen_at`, `last_source`,
/// `updated_at`, and the stored `hash` are bookkeeping and never appear
/// in the changed list; a call that only bumps them reports no updates.
/// `composite_key` and `first_seen_at` are immutable.
pub fn fill_or_improve(
    existing: &CanonicalJob,
    incoming: &CanonicalJob,
    now: DateTime<Utc>,
) -> (CanonicalJob, Vec<String>) {
    let mut merged = existing.clone();
    let mut updated: Vec<String> = Vec::new();

    if improve_string(&mut merged.title, &incoming.title) {
        updated.push(FIELD_TITLE.to_string());
    }

    let mut company_changed = improve_string(&mut merged.company.name, &incoming.company.name);
    company_changed |= improve_opt_string(&mut merged.company.domain, incoming.company.domain.as_deref());
    if company_changed {
        updated.push(FIELD_COMPANY.to_string());
    }

    let mut location_changed =
        improve_opt_string(&mut merged.location.city, incoming.location.city.as_deref());
    location_changed |=
        improve_opt_string(&mut merged.location.state, incoming.location.state.as_deref());
    location_changed |=
        improve_opt_string(&mut merged.location.country, incoming.location.country.as_deref());
    if merged.location.remote_type.is_none() && incoming.location.remote_type.is_some() {
        merged.location.remote_type = incoming.location.remote_type;
        location_changed = true;
    }
    if location_changed {
        updated.push(FIELD_LOCATION.to_string());
    }

    if merge_salary(&mut merged, incoming) {
        updated.push(FIELD_SALARY.to_string());
    }

    if merged.seniority == Seniority::Unknown && incoming.seniority != Seniority::Unknown {
        merged.seniority = incoming.seniority;
        updated.push(FIELD_SENIORITY.to_string());
    }

    if improve_opt_string(&mut merged.description, incoming.description.as_deref()) {
        updated.push(FIELD_DESCRIPTION.to_string());
    }
    if improve_opt_string(
        &mut merged.sanitized_description,
        incoming.sanitized_description.as_deref(),
    ) {
        updated.push(FIELD_SANITIZED_DESCRIPTION.to_string());
    }

    if union_into(&mut merged.skills, &incoming.skills) {
        updated.push(FIELD_SKILLS.to_string());
    }
    if union_into(&mut merged.benefits, &incoming.benefits) {
        updated.push(FIELD_BENEFITS.to_string());
    }

    // Expiry only ever moves forward.
    if let Some(incoming_expiry) = incoming.expires_at {
        if merged.expires_at.map(|e| incoming_expiry > e).unwrap_or(true) {
            merged.expires_at = Some(incoming_expiry);
            updated.push(FIELD_EXPIRES_AT.to_string());
        }
    }

    if let Some(count) = incoming.application_count {
        if merged.application_count.map(|c| count > c).unwrap_or(true) {
            merged.application_count = Some(count);
            updated.push(FIELD_APPLICATION_COUNT.to_string());
        }
    }

    if incoming.referral_available && !merged.referral_available {
        merged.referral_available = true;
        updated.push(FIELD_REFERRAL_AVAILABLE.to_string());
    }

    // Identity inputs fill in but never flip; the composite key already
    // bound this record to them.
    if merged.canonical_url.is_none() && incoming.canonical_url.is_some() {
        merged.canonical_url = incoming.canonical_url.clone();
        updated.push(FIELD_CANONICAL_URL.to_string());
    }
    if merged.external_id.is_none() && incoming.external_id.is_some() {
        merged.external_id = incoming.external_id.clone();
        updated.push(FIELD_EXTERNAL_ID.to_string());
    }

    if !updated.is_empty() {
        merged.hash = incoming.hash.clone();
    }
    merged.provenance.last_seen_at = now;
    merged.provenance.last_source = incoming.source;
    merged.updated_at = now;

    (merged, updated)
}

/// Field names considered "supplied" on a freshly created record, for the
/// create path's `updated_fields` report.
pub fn supplied_fields(job: &CanonicalJob) -> Vec<String> {
    let mut fields = vec![FIELD_TITLE.to_string(), FIELD_COMPANY.to_string()];
    if job.location.city.is_some()
        || job.location.state.is_some()
        || job.location.country.is_some()
        || job.location.remote_type.is_some()
    {
        fields.push(FIELD_LOCATION.to_string());
    }
    if job.salary.is_some() {
        fields.push(FIELD_SALARY.to_string());
    }
    if job.seniority != Seniority::Unknown {
        fields.push(FIELD_SENIORITY.to_string());
    }
    if job.description.is_some() {
        fields.push(FIELD_DESCRIPTION.to_string());
    }
    if job.sanitized_description.is_some() {
        fields.push(FIELD_SANITIZED_DESCRIPTION.to_string());
    }
    if !job.skills.is_empty() {
        fields.push(FIELD_SKILLS.to_string());
    }
    if !job.benefits.is_empty() {
        fields.push(FIELD_BENEFITS.to_string());
    }
    if job.expires_at.is_some() {
        fields.push(FIELD_EXPIRES_AT.to_string());
    }
    if job.application_count.is_some() {
        fields.push(FIELD_APPLICATION_COUNT.to_string());
    }
    if job.referral_available {
        fields.push(FIELD_REFERRAL_AVAILABLE.to_string());
    }
    if job.canonical_url.is_some() {
        fields.push(FIELD_CANONICAL_URL.to_string());
    }
    if job.external_id.is_some() {
        fields.push(FIELD_EXTERNAL_ID.to_string());
    }
    fields
}

fn merge_salary(merged: &mut CanonicalJob, incoming: &CanonicalJob) -> bool {
    let Some(incoming_salary) = incoming.salary.as_ref() else {
        return false;
    };
    if merged.salary.is_none() {
        merged.salary = Some(incoming_salary.clone());
        return true;
    }
    let Some(existing_salary) = merged.salary.as_mut() else {
        return false;
    };

    let mut changed = false;
    changed |= fill_f64(&mut existing_salary.min, incoming_salary.min);
    changed |= fill_f64(&mut existing_salary.max, incoming_salary.max);
    changed |= fill_opt_clone(&mut existing_salary.currency, incoming_salary.currency.as_ref());
    if existing_salary.period.is_none() && incoming_salary.period.is_some() {
        existing_salary.period = incoming_salary.period;
        changed = true;
    }
    changed |= fill_f64(
        &mut existing_salary.normalized_annual_min,
        incoming_salary.normalized_annual_min,
    );
    changed |= fill_f64(
        &mut existing_salary.normalized_annual_max,
        incoming_salary.normalized_annual_max,
    );
    changed |= fill_opt_clone(
        &mut existing_salary.normalized_currency,
        incoming_salary.normalized_currency.as_ref(),
    );
    changed
}

/// Overwrite a string only when it is empty or the incoming value is
/// strictly longer.
fn improve_string(existing: &mut String, incoming: &str) -> bool {
    if incoming.is_empty() {
        return false;
    }
    if existing.is_empty() || incoming.len() > existing.len() {
        if existing != incoming {
            *existing = incoming.to_string();
            return true;
        }
    }
    false
}

fn improve_opt_string(existing: &mut Option<String>, incoming: Option<&str>) -> bool {
    let Some(incoming) = incoming.filter(|s| !s.is_empty()) else {
        return false;
    };
    match existing.as_deref() {
        None | Some("") => {
            *existing = Some(incoming.to_string());
            true
        }
        Some(current) if incoming.len() > current.len() => {
            *existing = Some(incoming.to_string());
            true
        }
        Some(_) => false,
    }
}

fn fill_f64(existing: &mut Option<f64>, incoming: Option<f64>) -> bool {
    if existing.is_none() && incoming.is_some() {
        *existing = incoming;
        return true;
    }
    false
}

fn fill_opt_clone(existing: &mut Option<String>, incoming: Option<&String>) -> bool {
    if existing.is_none() && incoming.is_some() {
        *existing = incoming.cloned();
        return true;
    }
    false
}

/// Case-insensitive add-only union; returns whether anything was added.
fn union_into(existing: &mut Vec<String>, incoming: &[String]) -> bool {
    let mut changed = false;
    for item in incoming {
        if !existing.iter().any(|e| e.eq_ignore_ascii_case(item)) {
            existing.push(item.clone());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use jlip_core::{Company, JobDto, JobSource, Location, Salary};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).single().unwrap()
    }

    fn job(description: &str) -> CanonicalJob {
        let dto = JobDto {
            source: JobSource::Indeed,
            external_id: Some("77".into()),
            canonical_url: None,
            title: "Data Engineer".into(),
            company: Company {
                name: "Acme".into(),
                domain: None,
            },
            location: Location {
                city: Some("Berlin".into()),
                state: None,
                country: Some("DE".into()),
                remote_type: None,
            },
            salary: None,
            seniority: None,
            description: Some(description.into()),
            skills: vec![],
            benefits: vec![],
            posted_at: Some(now() - Duration::days(2)),
            expires_at: None,
            application_count: None,
            referral_available: None,
        };
        CanonicalJob::from_dto(dto, "hash-a".into(), "indeed:77".into(), now() - Duration::days(2))
    }

    #[test]
    fn longer_description_wins_shorter_does_not_regress() {
        let stored = job("short");
        let richer = {
            let mut j = job("a much longer and more complete description");
            j.hash = "hash-b".into();
            j
        };
        let (merged, updated) = fill_or_improve(&stored, &richer, now());
        assert!(updated.contains(&FIELD_DESCRIPTION.to_string()));
        assert_eq!(
            merged.description.as_deref(),
            Some("a much longer and more complete description")
        );
        assert_eq!(merged.hash, "hash-b");

        let thin = job("x");
        let (merged2, updated2) = fill_or_improve(&merged, &thin, now());
        assert!(!updated2.contains(&FIELD_DESCRIPTION.to_string()));
        assert_eq!(
            merged2.description.as_deref(),
            Some("a much longer and more complete description")
        );
    }

    #[test]
    fn identical_ingestion_reports_no_updates_but_bumps_last_seen() {
        let stored = job("same text");
        let later = now() + Duration::hours(3);
        let (merged, updated) = fill_or_improve(&stored, &stored.clone(), later);
        assert!(updated.is_empty());
        assert_eq!(merged.provenance.last_seen_at, later);
        assert_eq!(merged.provenance.first_seen_at, stored.provenance.first_seen_at);
        assert_eq!(merged.hash, stored.hash);
        assert_eq!(merged.composite_key, stored.composite_key);
    }

    #[test]
    fn expiry_only_moves_forward() {
        let mut stored = job("d");
        stored.expires_at = Some(now() + Duration::days(30));
        let mut earlier = job("d");
        earlier.expires_at = Some(now() + Duration::days(10));
        let (merged, updated) = fill_or_improve(&stored, &earlier, now());
        assert_eq!(merged.expires_at, Some(now() + Duration::days(30)));
        assert!(!updated.contains(&FIELD_EXPIRES_AT.to_string()));

        let mut later = job("d");
        later.expires_at = Some(now() + Duration::days(60));
        let (merged, updated) = fill_or_improve(&merged, &later, now());
        assert_eq!(merged.expires_at, Some(now() + Duration::days(60)));
        assert!(updated.contains(&FIELD_EXPIRES_AT.to_string()));
    }

    #[test]
    fn sets_are_unioned_add_only() {
        let mut stored = job("d");
        stored.skills = vec!["Rust".into(), "SQL".into()];
        let mut incoming = job("d");
        incoming.skills = vec!["rust".into(), "Kafka".into()];
        let (merged, updated) = fill_or_improve(&stored, &incoming, now());
        assert_eq!(merged.skills, vec!["Rust", "SQL", "Kafka"]);
        assert!(updated.contains(&FIELD_SKILLS.to_string()));
    }

    #[test]
    fn salary_fills_only_missing_subfields() {
        let mut stored = job("d");
        stored.salary = Some(Salary {
            min: Some(80_000.0),
            max: None,
            currency: Some("EUR".into()),
            ..Salary::default()
        });
        let mut incoming = job("d");
        incoming.salary = Some(Salary {
            min: Some(10.0),
            max: Some(120_000.0),
            currency: Some("USD".into()),
            ..Salary::default()
        });
        let (merged, updated) = fill_or_improve(&stored, &incoming, now());
        let salary = merged.salary.unwrap();
        assert_eq!(salary.min, Some(80_000.0));
        assert_eq!(salary.max, Some(120_000.0));
        assert_eq!(salary.currency.as_deref(), Some("EUR"));
        assert!(updated.contains(&FIELD_SALARY.to_string()));
    }

    #[test]
    fn seniority_fills_from_unknown_only() {
        let mut stored = job("d");
        stored.seniority = Seniority::Unknown;
        let mut incoming = job("d");
        incoming.seniority = Seniority::Senior;
        let (merged, updated) = fill_or_improve(&stored, &incoming, now());
        assert_eq!(merged.seniority, Seniority::Senior);
        assert!(updated.contains(&FIELD_SENIORITY.to_string()));

        let mut downgrade = job("d");
        downgrade.seniority = Seniority::Entry;
        let (merged, updated) = fill_or_improve(&merged, &downgrade, now());
        assert_eq!(merged.seniority, Seniority::Senior);
        assert!(!updated.contains(&FIELD_SENIORITY.to_string()));
    }

    #[test]
    fn application_count_takes_the_max() {
        let mut stored = job("d");
        stored.application_count = Some(12);
        let mut incoming = job("d");
        incoming.application_count = Some(7);
        let (merged, updated) = fill_or_improve(&stored, &incoming, now());
        assert_eq!(merged.application_count, Some(12));
        assert!(!updated.contains(&FIELD_APPLICATION_COUNT.to_string()));
    }

    #[test]
    fn supplied_fields_reflect_present_data() {
        let mut j = job("d");
        j.skills = vec!["Rust".into()];
        let fields = supplied_fields(&j);
        assert!(fields.contains(&FIELD_TITLE.to_string()));
        assert!(fields.contains(&FIELD_DESCRIPTION.to_string()));
        assert!(fields.contains(&FIELD_SKILLS.to_string()));
        assert!(!fields.contains(&FIELD_SALARY.to_string()));
        assert!(!fields.contains(&FIELD_BENEFITS.to_string()));
    }
}
