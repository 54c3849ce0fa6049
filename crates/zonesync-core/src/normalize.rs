//! Nameserver list normalization
//!
//! Nameserver sets are compared without regard to case or order. Both the
//! desired list (before it is sent) and the observed list (before it is
//! stored) go through [`normalize`], so equivalent sets never show up as a
//! change.

use crate::model::{Nameserver, NameserverFilter};

/// Case-fold, sort and de-duplicate a list of host names
///
/// Folding is ordinal (no locale rules). The result is idempotent:
/// `normalize(&normalize(l)) == normalize(l)`.
pub fn normalize<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut folded: Vec<String> = names
        .iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    folded.sort();
    folded.dedup();
    folded
}

/// Whether two lists denote the same nameserver set
pub fn same_set<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> bool {
    normalize(a) == normalize(b)
}

/// Resolve a nameserver class against the provider catalog
///
/// `All` resolves to `None`: the zone is created without explicit
/// nameservers and the provider applies its defaults.
pub fn resolve_filter(filter: NameserverFilter, catalog: &[Nameserver]) -> Option<Vec<String>> {
    if filter == NameserverFilter::All {
        return None;
    }

    let names: Vec<&str> = catalog
        .iter()
        .filter(|ns| ns.kind.eq_ignore_ascii_case(filter.as_str()))
        .map(|ns| ns.name.as_str())
        .collect();

    Some(normalize(&names))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(name: &str, kind: &str) -> Nameserver {
        Nameserver {
            name: name.to_string(),
            kind: kind.to_string(),
            ipv4: None,
            ipv6: None,
            location: None,
        }
    }

    #[test]
    fn test_normalize_sorts_and_dedups_case_insensitively() {
        let input = ["ns2.example.net", "NS1.example.net", "ns1.EXAMPLE.net"];
        assert_eq!(
            normalize(&input),
            vec!["ns1.example.net".to_string(), "ns2.example.net".to_string()]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = ["b", "A", "a", "C", "b"];
        let once = normalize(&input);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_ignores_order_and_case() {
        assert_eq!(normalize(&["NS1.x", "ns2.x"]), normalize(&["ns2.X", "ns1.X"]));
        assert!(same_set(&["NS1.x", "ns2.x"], &["ns2.X", "ns1.X"]));
        assert!(!same_set(&["ns1.x"], &["ns1.x", "ns2.x"]));
    }

    #[test]
    fn test_normalize_empty() {
        let empty: [&str; 0] = [];
        assert!(normalize(&empty).is_empty());
        assert!(normalize(&["", "  "]).is_empty());
    }

    #[test]
    fn test_resolve_filter() {
        let catalog = vec![
            ns("pns2.cloudns.net", "premium"),
            ns("ns1.cloudns.net", "free"),
            ns("PNS1.cloudns.net", "premium"),
            ns("ns2.cloudns.net", "free"),
        ];

        assert_eq!(resolve_filter(NameserverFilter::All, &catalog), None);
        assert_eq!(
            resolve_filter(NameserverFilter::Free, &catalog),
            Some(vec!["ns1.cloudns.net".to_string(), "ns2.cloudns.net".to_string()])
        );
        assert_eq!(
            resolve_filter(NameserverFilter::Premium, &catalog),
            Some(vec!["pns1.cloudns.net".to_string(), "pns2.cloudns.net".to_string()])
        );
    }

    #[test]
    fn test_resolve_filter_without_matches() {
        let catalog = vec![ns("ns1.cloudns.net", "free")];
        assert_eq!(resolve_filter(NameserverFilter::Premium, &catalog), Some(Vec::new()));
    }
}
