use std::collections::HashSet;

use crate::domain::{models::OrphanSet, value_objects::BucketName};

/// Buckets of `all_buckets` that no active stack declares.
///
/// A plain membership test against `declared_buckets`: a bucket declared by
/// several stacks is excluded once, and duplicates in `all_buckets` collapse.
pub fn compute_orphans<'a, I>(all_buckets: I, declared_buckets: &HashSet<BucketName>) -> OrphanSet
where
    I: IntoIterator<Item = &'a BucketName>,
{
    let mut orphans = OrphanSet::new();
    for bucket in all_buckets {
        if !declared_buckets.contains(bucket) {
            orphans.insert(bucket.clone());
        }
    }
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<BucketName> {
        values.iter().map(|v| BucketName::new(*v).unwrap()).collect()
    }

    fn set(values: &[&str]) -> HashSet<BucketName> {
        names(values).into_iter().collect()
    }

    fn orphan_names(orphans: &OrphanSet) -> Vec<&str> {
        orphans.iter().map(BucketName::as_str).collect()
    }

    #[test]
    fn test_difference_of_inventories() {
        let all = names(&["a", "b", "c"]);
        let orphans = compute_orphans(&all, &set(&["b"]));
        assert_eq!(orphan_names(&orphans), vec!["a", "c"]);
    }

    #[test]
    fn test_identical_inventories_leave_no_orphans() {
        let all = names(&["logs", "assets", "backups"]);
        let declared: HashSet<BucketName> = all.iter().cloned().collect();
        assert!(compute_orphans(&all, &declared).is_empty());
    }

    #[test]
    fn test_nothing_declared_means_everything_is_orphaned() {
        let all = names(&["logs", "assets", "logs"]);
        let orphans = compute_orphans(&all, &HashSet::new());
        assert_eq!(orphan_names(&orphans), vec!["assets", "logs"]);
    }

    #[test]
    fn test_empty_account_has_no_orphans() {
        let orphans = compute_orphans(&Vec::<BucketName>::new(), &set(&["declared-elsewhere"]));
        assert!(orphans.is_empty());
    }

    #[test]
    fn test_result_ignores_input_order_and_duplicates() {
        let declared = set(&["b", "d"]);
        let forward = compute_orphans(&names(&["a", "b", "c", "d", "e"]), &declared);
        let shuffled = compute_orphans(&names(&["e", "c", "a", "c", "d", "a", "b"]), &declared);
        assert_eq!(forward, shuffled);
        assert_eq!(orphan_names(&forward), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_declared_buckets_missing_from_account_are_ignored() {
        let orphans = compute_orphans(&names(&["a"]), &set(&["a", "ghost"]));
        assert!(orphans.is_empty());
    }
}
