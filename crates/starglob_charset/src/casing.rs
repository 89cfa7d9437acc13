//! Case-counterpart expansion for case-insensitive sets.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::set::Builder;

// Lowest and highest known code points that have a single-character case
// mapping.
const FIRST_CASED: u32 = 65;
const LAST_CASED: u32 = 125_251;

struct CaseMaps {
    /// Code point to its case counterpart, in both directions.
    counterparts: HashMap<u32, u32>,
    /// Every mapped code point with its counterpart, ascending.
    entries: Vec<(u32, u32)>,
}

static CASE_MAPS: Lazy<CaseMaps> = Lazy::new(build_case_maps);

fn build_case_maps() -> CaseMaps {
    let mut counterparts = HashMap::new();
    let mut entries = Vec::new();

    for cp in FIRST_CASED..LAST_CASED {
        if let Some(&other) = counterparts.get(&cp) {
            entries.push((cp, other));
            continue;
        }
        let Some(ch) = char::from_u32(cp) else { continue };
        let Some(other) = case_counterpart(ch) else {
            continue;
        };
        let other_cp = other as u32;
        counterparts.insert(cp, other_cp);
        counterparts.insert(other_cp, cp);
        entries.push((cp, other_cp));
    }

    CaseMaps { counterparts, entries }
}

/// The single-character case counterpart of `ch`, if it has one.
fn case_counterpart(ch: char) -> Option<char> {
    let mut lower = ch.to_lowercase();
    let (mut first, mut extra) = (lower.next(), lower.next());
    if first == Some(ch) && extra.is_none() {
        let mut upper = ch.to_uppercase();
        first = upper.next();
        extra = upper.next();
    }
    match (first, extra) {
        (Some(mapped), None) if mapped != ch => Some(mapped),
        _ => None,
    }
}

/// Adds the case counterpart of every collected character, and for every
/// range the counterpart of each maximal constant-offset run of mapped
/// code points inside it. A run breaks where the offset changes.
pub(crate) fn expand(builder: &mut Builder) {
    let maps = &*CASE_MAPS;

    let characters = builder.characters.len();
    for i in 0..characters {
        let cp = builder.characters[i];
        if let Some(&other) = maps.counterparts.get(&cp) {
            builder.use_code_point(other);
        }
    }

    let ranges = builder.ranges.len();
    for i in 0..ranges {
        let (start, end) = builder.ranges[i];
        let mut idx = maps.entries.partition_point(|&(cp, _)| cp < start);

        while idx < maps.entries.len() && maps.entries[idx].0 <= end {
            let (from, to) = maps.entries[idx];
            let offset = i64::from(to) - i64::from(from);
            let run_start = to;
            let mut run_end = to;
            idx += 1;

            while idx < maps.entries.len() && maps.entries[idx].0 <= end {
                let (from, to) = maps.entries[idx];
                if i64::from(to) - i64::from(from) != offset {
                    break;
                }
                run_end = to;
                idx += 1;
            }

            if run_start == run_end {
                builder.use_code_point(run_start);
            } else {
                builder.push_range(run_start.min(run_end), run_start.max(run_end));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_counterparts() {
        assert_eq!(case_counterpart('a'), Some('A'));
        assert_eq!(case_counterpart('A'), Some('a'));
        assert_eq!(case_counterpart('5'), None);
        assert_eq!(case_counterpart('_'), None);
    }

    #[test]
    fn multi_character_mappings_are_skipped() {
        // U+00DF expands to "SS" under uppercasing.
        assert_eq!(case_counterpart('\u{df}'), None);
    }

    #[test]
    fn table_is_symmetric_and_sorted() {
        let maps = &*CASE_MAPS;
        assert_eq!(maps.counterparts.get(&97), Some(&65));
        assert_eq!(maps.counterparts.get(&65), Some(&97));
        assert!(maps.entries.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn expand_adds_counterpart_runs() {
        let mut builder = Builder::new(false);
        builder.push_range(97, 99);
        expand(&mut builder);
        assert!(builder.ranges.contains(&(65, 67)));
    }

    #[test]
    fn expand_adds_single_counterparts() {
        let mut builder = Builder::new(false);
        builder.use_code_point(u32::from('m'));
        expand(&mut builder);
        assert!(builder.characters.contains(&u32::from('M')));
    }

    #[test]
    fn later_mappings_take_over_a_counterpart() {
        // U+212A (Kelvin sign) also lowercases to `k` and is scanned
        // after `K`, so it owns `k`'s counterpart slot.
        let maps = &*CASE_MAPS;
        assert_eq!(maps.counterparts.get(&u32::from('k')), Some(&0x212A));
        assert_eq!(maps.counterparts.get(&u32::from('K')), Some(&u32::from('k')));
    }
}
