//! Identity derivation: content hashing and composite-key construction.
//! Both are deterministic over the *normalized* DTO so that cosmetic
//! differences between sources do not split identities.

use jlip_core::JobDto;
use sha2::{Digest, Sha256};

/// How many leading description characters participate in the hash.
const HASH_DESCRIPTION_PREFIX: usize = 300;

/// Unit separator; keeps field concatenation unambiguous.
const HASH_FIELD_SEP: char = '\u{1f}';

/// Content fingerprint over title, company name, city, country, and the
/// leading slice of the description, case-folded.
pub fn content_hash(dto: &JobDto) -> String {
    let description_prefix: String = dto
        .description
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(HASH_DESCRIPTION_PREFIX)
        .collect();

    let mut hasher = Sha256::new();
    for part in [
        dto.title.as_str(),
        dto.company.name.as_str(),
        dto.location.city.as_deref().unwrap_or_default(),
        dto.location.country.as_deref().unwrap_or_default(),
        description_prefix.as_str(),
    ] {
        hasher.update(part.to_lowercase().as_bytes());
        hasher.update(HASH_FIELD_SEP.to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Durable identity of a logical posting. Priority: source-local id,
/// then normalized URL, then the content hash as last resort. The hash
/// path is content-sensitive by design: text drift there mints a new
/// identity.
pub fn composite_key(dto: &JobDto, hash: &str) -> String {
    if let Some(external_id) = dto.external_id.as_deref().filter(|s| !s.trim().is_empty()) {
        return format!("{}:{}", dto.source, external_id.trim());
    }
    if let Some(url) = dto.canonical_url.as_deref().filter(|s| !s.trim().is_empty()) {
        return format!("{}:{}", dto.source, normalize_url(url));
    }
    format!("{}:{}", dto.source, hash)
}

/// Strip query string and fragment, lowercase scheme and host. The path
/// keeps its case; many ATS slugs are case-sensitive.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);

    match without_query.find("://") {
        Some(scheme_end) => {
            let (scheme, rest) = without_query.split_at(scheme_end);
            let rest = &rest[3..];
            let host_end = rest.find('/').unwrap_or(rest.len());
            let (host, path) = rest.split_at(host_end);
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                host.to_ascii_lowercase(),
                path
            )
        }
        None => without_query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jlip_core::{Company, JobSource, Location};

    fn dto(external_id: Option<&str>, url: Option<&str>) -> JobDto {
        JobDto {
            source: JobSource::Lever,
            external_id: external_id.map(Into::into),
            canonical_url: url.map(Into::into),
            title: "Platform Engineer".into(),
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
            description: Some("Keep the platform healthy.".into()),
            skills: vec![],
            benefits: vec![],
            posted_at: None,
            expires_at: None,
            application_count: None,
            referral_available: None,
        }
    }

    #[test]
    fn hash_is_stable_and_case_folded() {
        let a = dto(None, None);
        let mut b = dto(None, None);
        b.title = "PLATFORM ENGINEER".into();
        b.company.name = "ACME".into();
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn hash_changes_with_content() {
        let a = dto(None, None);
        let mut b = dto(None, None);
        b.description = Some("Totally different posting.".into());
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn external_id_takes_priority_over_url_and_hash() {
        let d = dto(Some("job-77"), Some("https://jobs.acme.example/p/1"));
        let hash = content_hash(&d);
        assert_eq!(composite_key(&d, &hash), "lever:job-77");
    }

    #[test]
    fn url_key_ignores_query_and_fragment() {
        let a = dto(None, Some("https://Jobs.Acme.example/p/1?utm=x&ref=mail"));
        let b = dto(None, Some("https://jobs.acme.example/p/1#apply"));
        let ha = content_hash(&a);
        let hb = content_hash(&b);
        assert_eq!(composite_key(&a, &ha), composite_key(&b, &hb));
    }

    #[test]
    fn url_path_case_is_preserved() {
        assert_eq!(
            normalize_url("HTTPS://Jobs.Acme.example/Postings/AbC?q=1"),
            "https://jobs.acme.example/Postings/AbC"
        );
    }

    #[test]
    fn hash_is_the_fallback_identity() {
        let d = dto(None, None);
        let hash = content_hash(&d);
        assert_eq!(composite_key(&d, &hash), format!("lever:{}", hash));
    }

    #[test]
    fn blank_external_id_falls_through_to_url() {
        let d = dto(Some("   "), Some("https://jobs.acme.example/p/2"));
        let hash = content_hash(&d);
        assert_eq!(
            composite_key(&d, &hash),
            "lever:https://jobs.acme.example/p/2"
        );
    }
}
