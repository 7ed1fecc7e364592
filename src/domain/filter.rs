//! Filtering of the item list into the view shown to the user.

use super::models::{Filter, Item};

/// Returns the items selected by `filter`, in their original order.
///
/// The input is left untouched; the result is a fresh vector.
pub fn filter_items(filter: Filter, items: &[Item]) -> Vec<Item> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Number of items not yet completed, regardless of any active filter.
pub fn count_active(items: &[Item]) -> usize {
    items.iter().filter(|item| !item.complete).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemKey;
    use proptest::prelude::*;

    fn item(key: i64, text: &str, complete: bool) -> Item {
        Item {
            key: ItemKey(key),
            text: text.to_string(),
            complete,
            editing: false,
        }
    }

    fn sample() -> Vec<Item> {
        vec![
            item(1, "A", false),
            item(2, "B", true),
            item(3, "C", false),
            item(4, "D", true),
        ]
    }

    #[test]
    fn test_filter_all_is_identity() {
        let items = sample();
        assert_eq!(filter_items(Filter::All, &items), items);
    }

    #[test]
    fn test_filter_active() {
        let keys: Vec<i64> = filter_items(Filter::Active, &sample())
            .iter()
            .map(|i| i.key.0)
            .collect();
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn test_filter_completed() {
        let keys: Vec<i64> = filter_items(Filter::Completed, &sample())
            .iter()
            .map(|i| i.key.0)
            .collect();
        assert_eq!(keys, vec![2, 4]);
    }

    #[test]
    fn test_filter_empty_list() {
        for filter in Filter::ALL_FILTERS {
            assert!(filter_items(filter, &[]).is_empty());
        }
    }

    #[test]
    fn test_count_active() {
        assert_eq!(count_active(&sample()), 2);
        assert_eq!(count_active(&[]), 0);
    }

    fn arb_items() -> impl Strategy<Value = Vec<Item>> {
        prop::collection::vec(("[a-z ]{0,12}", any::<bool>()), 0..32).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (text, complete))| item(i as i64, &text, complete))
                .collect()
        })
    }

    fn is_subsequence(sub: &[Item], full: &[Item]) -> bool {
        let mut rest = full.iter();
        sub.iter().all(|wanted| rest.any(|candidate| candidate == wanted))
    }

    proptest! {
        #[test]
        fn filtered_view_is_ordered_subsequence(items in arb_items()) {
            for filter in Filter::ALL_FILTERS {
                let view = filter_items(filter, &items);
                prop_assert!(is_subsequence(&view, &items));
            }
        }

        #[test]
        fn all_filter_returns_input(items in arb_items()) {
            prop_assert_eq!(filter_items(Filter::All, &items), items);
        }

        #[test]
        fn active_and_completed_partition_input(items in arb_items()) {
            let active = filter_items(Filter::Active, &items);
            let completed = filter_items(Filter::Completed, &items);

            prop_assert_eq!(active.len() + completed.len(), items.len());
            prop_assert!(active.iter().all(|a| !completed.iter().any(|c| c.key == a.key)));

            let mut merged: Vec<Item> = active.into_iter().chain(completed).collect();
            merged.sort_by_key(|i| i.key);
            prop_assert_eq!(merged, items);
        }

        #[test]
        fn count_matches_active_view(items in arb_items()) {
            prop_assert_eq!(count_active(&items), filter_items(Filter::Active, &items).len());
        }
    }
}
