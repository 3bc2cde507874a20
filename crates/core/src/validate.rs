//! Region and bucket-name validation
//!
//! Both checks are pure functions returning a [`ValidationOutcome`]; the
//! interactive recovery around them lives in [`crate::request`].

use std::sync::LazyLock;

use regex::Regex;

/// Largest edit distance at which a catalog region is offered as a correction
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Known AWS regions, in suggestion priority order
pub const KNOWN_REGIONS: &[&str] = &[
    "af-south-1",
    "il-central-1",
    "ap-east-1",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ca-central-1",
    "eu-central-1",
    "eu-central-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "me-central-1",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "cn-north-1",
    "cn-northwest-1",
    "us-gov-east-1",
    "us-gov-west-1",
    "us-iso-east-1",
    "us-isob-east-1",
];

pub const BUCKET_NAME_MESSAGE: &str = "Bucket name must be 3-63 characters long, only contain lowercase letters, numbers, dots, and hyphens, and must start and end with a letter or number.";

pub const BUCKET_IP_MESSAGE: &str =
    "Bucket name cannot be formatted as an IP address (e.g., 192.168.1.1).";

static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(af|il|ap|ca|eu|me|sa|us|cn|us-gov|us-iso|us-isob)-(central|north|(north(?:east|west))|south|south(?:east|west)|east|west)-\d$",
    )
    .expect("valid region pattern")
});

static BUCKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("valid bucket pattern")
});

static IP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").expect("valid ip pattern"));

/// Result of validating a single configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid {
        message: String,
        suggestion: Option<String>,
    },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid { suggestion, .. } => suggestion.as_deref(),
        }
    }
}

/// Validate an AWS region identifier
///
/// Strings outside the region grammar are invalid. When a catalog entry lies
/// within [`MAX_SUGGESTION_DISTANCE`] edits, the first entry at the minimum
/// distance becomes the suggestion.
pub fn validate_region(region: &str) -> ValidationOutcome {
    if REGION_RE.is_match(region) {
        return ValidationOutcome::Valid;
    }

    ValidationOutcome::Invalid {
        message: format!("Invalid AWS region: {region}"),
        suggestion: closest_region(region).map(str::to_string),
    }
}

/// First catalog region at minimal edit distance, if close enough
pub fn closest_region(region: &str) -> Option<&'static str> {
    let mut best: Option<(&'static str, usize)> = None;

    for &known in KNOWN_REGIONS {
        let dist = levenshtein(region, known);
        match best {
            None => best = Some((known, dist)),
            Some((_, best_dist)) if dist < best_dist => best = Some((known, dist)),
            _ => {}
        }
    }

    match best {
        Some((known, dist)) if dist <= MAX_SUGGESTION_DISTANCE => Some(known),
        _ => None,
    }
}

/// Validate an S3 bucket name
pub fn validate_bucket_name(bucket: &str) -> ValidationOutcome {
    if !BUCKET_RE.is_match(bucket) {
        return ValidationOutcome::Invalid {
            message: BUCKET_NAME_MESSAGE.to_string(),
            suggestion: None,
        };
    }

    if IP_RE.is_match(bucket) {
        return ValidationOutcome::Invalid {
            message: BUCKET_IP_MESSAGE.to_string(),
            suggestion: None,
        };
    }

    ValidationOutcome::Valid
}

/// Levenshtein distance over chars
///
/// Insertions and deletions cost 1; a substitution costs 2.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row: Vec<usize> = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + 2 * cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}
