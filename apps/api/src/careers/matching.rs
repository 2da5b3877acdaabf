//! Two-pass career matching against the catalog.
//!
//! Pass 1 respects the order of the student's code — the strongest dimension
//! dominates. Pass 2 runs only when pass 1 finds nothing and trades order
//! fidelity for recall, down to "shares every letter" as the last resort.
//! Results keep catalog file order and are never re-ranked by match quality.

use crate::careers::CareerCatalog;

/// Matches a 1–3 letter dimension code against the catalog.
pub fn match_careers(catalog: &CareerCatalog, code: &str) -> Vec<String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Vec::new();
    }

    let ordered: Vec<String> = catalog
        .entries()
        .iter()
        .filter(|entry| ordered_match(&entry.code, &code))
        .map(|entry| entry.name.clone())
        .collect();
    if !ordered.is_empty() {
        return ordered;
    }

    let perms = permutations(&code);
    catalog
        .entries()
        .iter()
        .filter(|entry| permutation_match(&entry.code, &perms, &code))
        .map(|entry| entry.name.clone())
        .collect()
}

/// Pass 1: prefix, contiguous substring, or in-order subsequence.
fn ordered_match(entry_code: &str, code: &str) -> bool {
    entry_code.starts_with(code)
        || entry_code.contains(code)
        || is_subsequence(entry_code, code)
}

/// Pass 2: any letter permutation as prefix/substring, else every letter
/// present in any order.
fn permutation_match(entry_code: &str, perms: &[String], code: &str) -> bool {
    for perm in perms {
        if entry_code == perm || entry_code.starts_with(perm) || entry_code.contains(perm) {
            return true;
        }
    }
    contains_all_letters(entry_code, code)
}

/// True if every char of `needle` appears in `haystack` in the same relative
/// order, not necessarily contiguously.
fn is_subsequence(haystack: &str, needle: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}

fn contains_all_letters(entry_code: &str, code: &str) -> bool {
    code.chars().all(|c| entry_code.contains(c))
}

/// All permutations of the code's letters. Input is at most 6 letters in
/// practice, 3 on the hot path.
fn permutations(code: &str) -> Vec<String> {
    let mut letters: Vec<char> = code.chars().collect();
    let mut out = Vec::new();
    let len = letters.len();
    permute(&mut letters, 0, len, &mut out);
    out
}

fn permute(letters: &mut Vec<char>, start: usize, len: usize, out: &mut Vec<String>) {
    if start == len {
        out.push(letters.iter().collect());
        return;
    }
    for i in start..len {
        letters.swap(start, i);
        permute(letters, start + 1, len, out);
        letters.swap(start, i);
    }
}
