//! Dictionary enrichment: infer skills and benefits from title and
//! description text and union them into the record's existing sets.

use jlip_core::CanonicalJob;

/// Canonical display forms; matching is case-insensitive.
const SKILL_TERMS: &[&str] = &[
    "Rust",
    "Go",
    "Python",
    "Java",
    "Kotlin",
    "JavaScript",
    "TypeScript",
    "React",
    "Vue",
    "Node.js",
    "SQL",
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "Kafka",
    "Docker",
    "Kubernetes",
    "Terraform",
    "AWS",
    "GCP",
    "Azure",
    "GraphQL",
    "gRPC",
    "Machine Learning",
    "Data Engineering",
    "CI/CD",
];

const BENEFIT_TERMS: &[&str] = &[
    "Health Insurance",
    "Dental",
    "Vision",
    "401k",
    "Pension",
    "Equity",
    "Stock Options",
    "Remote Work",
    "Flexible Hours",
    "Unlimited PTO",
    "Parental Leave",
    "Learning Budget",
    "Gym Membership",
    "Relocation",
];

/// Scan title+description against the static dictionaries and add any
/// matches not already present (case-insensitive). Existing entries are
/// never removed or re-cased.
pub fn enrich(mut job: CanonicalJob) -> CanonicalJob {
    let haystack = format!(
        "{} {}",
        job.title,
        job.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    for term in SKILL_TERMS {
        if contains_term(&haystack, term) {
            push_unique(&mut job.skills, term);
        }
    }
    for term in BENEFIT_TERMS {
        if contains_term(&haystack, term) {
            push_unique(&mut job.benefits, term);
        }
    }
    job
}

fn push_unique(set: &mut Vec<String>, term: &str) {
    if !set.iter().any(|existing| existing.eq_ignore_ascii_case(term)) {
        set.push(term.to_string());
    }
}

/// Containment with boundary checks so short terms ("Go", "R") do not
/// fire inside unrelated words.
fn contains_term(haystack: &str, term: &str) -> bool {
    let needle = term.to_lowercase();
    let mut search_from = 0;
    while let Some(rel) = haystack[search_from..].find(&needle) {
        let start = search_from + rel;
        let end = start + needle.len();
        let before_ok = start == 0
            || haystack[..start]
                .chars()
                .next_back()
                .map(|c| !c.is_alphanumeric())
                .unwrap_or(true);
        let after_ok = end == haystack.len()
            || haystack[end..]
                .chars()
                .next()
                .map(|c| !c.is_alphanumeric())
                .unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
        search_from = end;
    }
    false
}
