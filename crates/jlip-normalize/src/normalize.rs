//! Canonicalization of accepted DTOs: title rewriting, location shape,
//! remote-type inference, salary period conversion, seniority inference,
//! and markup stripping. Pure functions over already-validated input.

use std::sync::LazyLock;

use jlip_core::{JobDto, RemoteType, SalaryPeriod, Seniority};
use regex::Regex;

/// Workday-based conversion factors: 8h days, 260 workdays a year.
const HOURS_PER_YEAR: f64 = 8.0 * 260.0;
const DAYS_PER_YEAR: f64 = 260.0;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Abbreviations expanded before title casing. Matched per
/// whitespace-separated word on the lowercased title.
const TITLE_SYNONYMS: &[(&str, &str)] = &[
    ("sr", "senior"),
    ("sr.", "senior"),
    ("jr", "junior"),
    ("jr.", "junior"),
    ("mgr", "manager"),
    ("eng", "engineer"),
    ("engr", "engineer"),
    ("dev", "developer"),
    ("swe", "software engineer"),
];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));

/// Ordered seniority keyword classes; the first matching class wins.
static SENIORITY_CLASSES: LazyLock<Vec<(Seniority, Regex)>> = LazyLock::new(|| {
    vec![
        (
            Seniority::Entry,
            Regex::new(r"\b(entry[- ]level|junior|intern(ship)?|graduate)\b").expect("entry regex"),
        ),
        (
            Seniority::Senior,
            Regex::new(r"\b(senior|principal|staff)\b").expect("senior regex"),
        ),
        (Seniority::Lead, Regex::new(r"\blead\b").expect("lead regex")),
        (
            Seniority::Director,
            Regex::new(r"\bdirector\b").expect("director regex"),
        ),
        (
            Seniority::Vp,
            Regex::new(r"\b(vp|vice president)\b").expect("vp regex"),
        ),
        (
            Seniority::Cxo,
            Regex::new(r"\b(ceo|cto|cfo|coo|cpo|chief \w+ officer)\b").expect("cxo regex"),
        ),
    ]
});

/// Knobs the normalizer needs from configuration.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub base_currency: String,
    pub default_country: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            base_currency: "USD".to_string(),
            default_country: "US".to_string(),
        }
    }
}

/// Rewrite an accepted DTO into canonical form.
pub fn normalize(mut dto: JobDto, opts: &NormalizeOptions) -> JobDto {
    dto.title = normalize_title(&dto.title);

    dto.location.country = Some(
        dto.location
            .country
            .as_deref()
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| opts.default_country.to_ascii_uppercase()),
    );

    if dto.location.remote_type.is_none() {
        dto.location.remote_type = Some(infer_remote_type(
            &dto.title,
            dto.description.as_deref().unwrap_or_default(),
        ));
    }

    if let Some(salary) = dto.salary.as_mut() {
        if salary.min.is_some() || salary.max.is_some() {
            // Unspecified periods are read as annual figures.
            let period = salary.period.unwrap_or(SalaryPeriod::Year);
            salary.normalized_annual_min = salary.min.map(|v| annualize(v, period));
            salary.normalized_annual_max = salary.max.map(|v| annualize(v, period));
            salary.normalized_currency = Some(
                salary
                    .currency
                    .as_deref()
                    .map(|c| c.trim().to_ascii_uppercase())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| opts.base_currency.to_ascii_uppercase()),
            );
        }
    }

    if matches!(dto.seniority, None | Some(Seniority::Unknown)) {
        dto.seniority = Some(infer_seniority(
            &dto.title,
            dto.description.as_deref().unwrap_or_default(),
        ));
    }

    dto.description = dto.description.as_deref().map(strip_tags);

    dto
}

/// Lowercase, collapse whitespace, expand abbreviations, then title-case.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let expanded = lowered
        .split_whitespace()
        .map(|word| {
            TITLE_SYNONYMS
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ");
    expanded
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::new();
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

pub fn infer_remote_type(title: &str, description: &str) -> RemoteType {
    let haystack = format!("{} {}", title, description).to_lowercase();
    if haystack.contains("remote") {
        RemoteType::Remote
    } else if haystack.contains("hybrid") {
        RemoteType::Hybrid
    } else {
        RemoteType::Onsite
    }
}

pub fn annualize(amount: f64, period: SalaryPeriod) -> f64 {
    match period {
        SalaryPeriod::Hour => amount * HOURS_PER_YEAR,
        SalaryPeriod::Day => amount * DAYS_PER_YEAR,
        SalaryPeriod::Month => amount * MONTHS_PER_YEAR,
        SalaryPeriod::Year => amount,
    }
}

pub fn infer_seniority(title: &str, description: &str) -> Seniority {
    let haystack = format!("{} {}", title, description).to_lowercase();
    for (seniority, pattern) in SENIORITY_CLASSES.iter() {
        if pattern.is_match(&haystack) {
            return *seniority;
        }
    }
    Seniority::Mid
}

/// Lightweight markup removal; not an HTML parser. Tags become spaces,
/// a handful of common entities are decoded, whitespace is collapsed.
pub fn strip_tags(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jlip_core::{Company, JobSource, Location, Salary};

    fn dto(title: &str) -> JobDto {
        JobDto {
            source: JobSource::Indeed,
            external_id: None,
            canonical_url: None,
            title: title.into(),
            company: Company {
                name: "Acme".into(),
                domain: None,
            },
            location: Location::default(),
            salary: None,
            seniority: None,
            description: None,
            skills: vec![],
            benefits: vec![],
            posted_at: None,
            expires_at: None,
            application_count: None,
            referral_available: None,
        }
    }

    #[test]
    fn title_is_expanded_and_cased() {
        assert_eq!(normalize_title("sr.  backend   ENG"), "Senior Backend Engineer");
        assert_eq!(normalize_title("jr dev"), "Junior Developer");
        assert_eq!(normalize_title("swe"), "Software Engineer");
    }

    #[test]
    fn country_defaults_and_uppercases() {
        let opts = NormalizeOptions::default();
        let mut d = dto("Engineer");
        d.location.country = Some("de".into());
        assert_eq!(
            normalize(d, &opts).location.country.as_deref(),
            Some("DE")
        );
        let d = dto("Engineer");
        assert_eq!(
            normalize(d, &opts).location.country.as_deref(),
            Some("US")
        );
    }

    #[test]
    fn remote_type_is_inferred_from_text() {
        let opts = NormalizeOptions::default();
        let mut d = dto("Remote Data Engineer");
        d = normalize(d, &opts);
        assert_eq!(d.location.remote_type, Some(RemoteType::Remote));

        let mut d = dto("Data Engineer");
        d.description = Some("Hybrid schedule, 2 days in office".into());
        d = normalize(d, &opts);
        assert_eq!(d.location.remote_type, Some(RemoteType::Hybrid));

        let d = normalize(dto("Data Engineer"), &opts);
        assert_eq!(d.location.remote_type, Some(RemoteType::Onsite));
    }

    #[test]
    fn hourly_salary_annualizes_with_workday_factors() {
        let opts = NormalizeOptions::default();
        let mut d = dto("Engineer");
        d.salary = Some(Salary {
            min: Some(10.0),
            max: Some(20.0),
            period: Some(SalaryPeriod::Hour),
            ..Salary::default()
        });
        let salary = normalize(d, &opts).salary.unwrap();
        assert_eq!(salary.normalized_annual_min, Some(20_800.0));
        assert_eq!(salary.normalized_annual_max, Some(41_600.0));
        assert_eq!(salary.normalized_currency.as_deref(), Some("USD"));
    }

    #[test]
    fn monthly_salary_annualizes_and_keeps_foreign_currency() {
        let opts = NormalizeOptions::default();
        let mut d = dto("Engineer");
        d.salary = Some(Salary {
            min: Some(5_000.0),
            max: None,
            currency: Some("eur".into()),
            period: Some(SalaryPeriod::Month),
            ..Salary::default()
        });
        let salary = normalize(d, &opts).salary.unwrap();
        assert_eq!(salary.normalized_annual_min, Some(60_000.0));
        assert_eq!(salary.normalized_annual_max, None);
        // No FX conversion: the source currency is carried through.
        assert_eq!(salary.normalized_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn seniority_classes_apply_in_order() {
        assert_eq!(infer_seniority("Junior Engineer", ""), Seniority::Entry);
        assert_eq!(infer_seniority("Senior Director of Data", ""), Seniority::Senior);
        assert_eq!(infer_seniority("Engineering Lead", ""), Seniority::Lead);
        assert_eq!(infer_seniority("Director, Platform", ""), Seniority::Director);
        assert_eq!(infer_seniority("VP Engineering", ""), Seniority::Vp);
        assert_eq!(infer_seniority("CTO", ""), Seniority::Cxo);
        assert_eq!(infer_seniority("Backend Engineer", ""), Seniority::Mid);
    }

    #[test]
    fn seniority_keywords_need_word_boundaries() {
        // "leadership" must not read as Lead, "seniority" not as Senior.
        assert_eq!(
            infer_seniority("Engineer", "strong leadership seniority signals"),
            Seniority::Mid
        );
    }

    #[test]
    fn supplied_seniority_is_preserved() {
        let opts = NormalizeOptions::default();
        let mut d = dto("Junior Engineer");
        d.seniority = Some(Seniority::Lead);
        assert_eq!(normalize(d, &opts).seniority, Some(Seniority::Lead));
    }

    #[test]
    fn markup_is_stripped_from_description() {
        assert_eq!(
            strip_tags("<p>Build&nbsp;things<br/>fast &amp; well</p>"),
            "Build things fast & well"
        );
    }
}
