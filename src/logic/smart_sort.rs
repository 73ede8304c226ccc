//! Deterministic ordering for option labels.

use std::cmp::Ordering;

/// Split `s` into (text with the first digit run removed, that digit run's value).
fn split_number(s: &str) -> (String, Option<u128>) {
    let Some(start) = s.find(|c: char| c.is_ascii_digit()) else {
        return (s.trim().to_string(), None);
    };
    let end = s[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |off| start + off);
    let digits = &s[start..end];
    let prefix = format!("{}{}", &s[..start], &s[end..]);
    (prefix.trim().to_string(), digits.parse::<u128>().ok())
}

/// What: Compare two labels the way a human expects ("Mech2" before "Mech10").
///
/// Inputs:
/// - `a`, `b`: Labels to compare.
///
/// Output:
/// - Total ordering.
///
/// Details:
/// - The text around the first embedded integer is compared case-insensitively first.
/// - On a text tie, both numbers compare numerically; a label with a number sorts
///   before one without.
/// - Remaining ties fall back to plain lexicographic comparison of the full labels.
#[must_use]
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    let (pa, na) = split_number(a);
    let (pb, nb) = split_number(b);
    pa.to_lowercase()
        .cmp(&pb.to_lowercase())
        .then_with(|| match (na, nb) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}

/// What: Order option labels by a predefined priority list, then naturally.
///
/// Inputs:
/// - `options`: Labels to order.
/// - `predefined_order`: Priority entries; an entry ending in `*` matches every
///   remaining label starting with the text before the `*`.
///
/// Output:
/// - A permutation of `options`.
///
/// Details:
/// - Without a predefined order the labels are sorted with [`natural_compare`].
/// - Wildcard groups are naturally sorted internally; plain entries are emitted
///   once when present; unmatched labels follow, naturally sorted.
#[must_use]
pub fn smart_sort<I, S>(options: I, predefined_order: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut items: Vec<String> = options.into_iter().map(Into::into).collect();
    if predefined_order.is_empty() {
        items.sort_by(|a, b| natural_compare(a, b));
        return items;
    }
    let mut used = vec![false; items.len()];
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for entry in predefined_order {
        if let Some(prefix) = entry.strip_suffix('*') {
            let mut group: Vec<usize> = (0..items.len())
                .filter(|&i| !used[i] && items[i].starts_with(prefix))
                .collect();
            group.sort_by(|&x, &y| natural_compare(&items[x], &items[y]));
            for i in group {
                used[i] = true;
                out.push(items[i].clone());
            }
        } else if let Some(i) = (0..items.len()).find(|&i| !used[i] && items[i] == *entry) {
            used[i] = true;
            out.push(items[i].clone());
        }
    }
    let mut rest: Vec<String> = items
        .drain(..)
        .zip(used)
        .filter_map(|(item, taken)| (!taken).then_some(item))
        .collect();
    rest.sort_by(|a, b| natural_compare(a, b));
    out.extend(rest);
    out
}
