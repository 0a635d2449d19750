//! Username variant generation.
//!
//! Turns a full name into the handles a person is likely to use across
//! platforms. Candidates are built from the lowercased alphanumeric tokens
//! of the name by these rules, in this order:
//!
//! 1. concatenation: `janedoe`
//! 2. dot separator: `jane.doe`
//! 3. underscore separator: `jane_doe`
//! 4. first initial: `jdoe`
//! 5. last initial: `janed`
//! 6. reversed: `doejane`
//! 7. suffix: `janedoeofficial`
//! 8. suffix: `janedoehq`
//! 9. reversed with dot: `doe.jane`
//! 10. short form: `jandoe` (first three chars of the first name)
//!
//! Single-token names produce the token and its prefixed/suffixed forms.
//! Every candidate is cut to `MAX_USERNAME_LEN` chars, duplicates are dropped
//! (first occurrence wins) and at most `MAX_USERNAME_VARIANTS` are returned.

/// Upper bound on the number of variants returned.
pub const MAX_USERNAME_VARIANTS: usize = 8;

/// Longest handle most platforms accept.
pub const MAX_USERNAME_LEN: usize = 30;

/// Returned when the name has no usable characters at all.
const FALLBACK_USERNAME: &str = "anonymous";

/// Generate plausible username variants for `full_name`.
///
/// Deterministic, never empty, lowercase.
pub fn generate_username_variants(full_name: &str) -> Vec<String> {
    let tokens: Vec<String> = full_name
        .split_whitespace()
        .map(normalize_token)
        .filter(|token| !token.is_empty())
        .collect();

    let candidates: Vec<String> = match tokens.as_slice() {
        [] => vec![FALLBACK_USERNAME.to_string()],
        [only] => vec![
            only.clone(),
            format!("{}official", only),
            format!("{}hq", only),
            format!("real{}", only),
            format!("the{}", only),
        ],
        [first, .., last] => {
            let first_initial: String = first.chars().take(1).collect();
            let last_initial: String = last.chars().take(1).collect();
            let short_first: String = first.chars().take(3).collect();
            vec![
                format!("{}{}", first, last),
                format!("{}.{}", first, last),
                format!("{}_{}", first, last),
                format!("{}{}", first_initial, last),
                format!("{}{}", first, last_initial),
                format!("{}{}", last, first),
                format!("{}{}official", first, last),
                format!("{}{}hq", first, last),
                format!("{}.{}", last, first),
                format!("{}{}", short_first, last),
            ]
        }
    };

    let mut variants: Vec<String> = Vec::with_capacity(MAX_USERNAME_VARIANTS);
    for candidate in candidates {
        let candidate: String = candidate.chars().take(MAX_USERNAME_LEN).collect();
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
        if variants.len() == MAX_USERNAME_VARIANTS {
            break;
        }
    }
    variants
}

/// Lowercase a name token and keep only alphanumeric chars.
fn normalize_token(token: &str) -> String {
    token
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
