//! Property-based tests for version selection.
//!
//! These tests use proptest to generate random catalogs and pattern sets and
//! verify that the selection invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use crate::catalog::VersionCatalog;
    use crate::selection::Selector;
    use crate::version::Version;
    use glob::Pattern;
    use proptest::prelude::*;

    fn catalog_strategy() -> impl Strategy<Value = VersionCatalog> {
        prop::collection::vec(("[a-z]{1,3}(-[0-9])?", any::<bool>()), 0..12).prop_map(|items| {
            let versions = items
                .into_iter()
                .enumerate()
                .map(|(i, (name, is_tag))| {
                    let commit = format!("{:07x}", i);
                    if is_tag {
                        Version::tag(&name, &commit)
                    } else {
                        Version::remote_branch("origin", &name, &commit)
                    }
                })
                .collect();
            VersionCatalog::from_versions(versions)
        })
    }

    fn pattern_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,3}",
            "[a-z]{0,2}\\*",
            "[a-z]\\?[a-z]?",
            "\\*-[0-9]",
        ]
    }

    // ============================================================================
    // no-input identity
    // ============================================================================

    proptest! {
        /// Property: without include patterns or regex the catalog comes back unchanged
        #[test]
        fn empty_selection_is_identity(catalog in catalog_strategy()) {
            let selector = Selector::new(&[], &[], None, false).unwrap();
            prop_assert_eq!(selector.resolve(&catalog), catalog.all().to_vec());
        }
    }

    // ============================================================================
    // exclusion and deduplication
    // ============================================================================

    proptest! {
        /// Property: no selected name matches an exclude pattern, however it entered
        #[test]
        fn exclude_always_wins(
            catalog in catalog_strategy(),
            include in prop::collection::vec(pattern_strategy(), 0..4),
            exclude in prop::collection::vec(pattern_strategy(), 0..4),
            regex in prop::option::of("[a-z]{1,2}"),
            force in any::<bool>(),
        ) {
            let selector = Selector::new(&include, &exclude, regex.as_deref(), force).unwrap();
            let compiled: Vec<Pattern> = exclude.iter().map(|p| Pattern::new(p).unwrap()).collect();

            for version in selector.resolve(&catalog) {
                prop_assert!(
                    !compiled.iter().any(|p| p.matches(&version.name)),
                    "{} survived exclusion by {:?}",
                    version.name,
                    exclude
                );
            }
        }

        /// Property: each name appears at most once
        #[test]
        fn result_is_deduplicated(
            catalog in catalog_strategy(),
            include in prop::collection::vec(pattern_strategy(), 0..5),
            regex in prop::option::of("[a-z]{1,2}"),
        ) {
            let selector = Selector::new(&include, &[], regex.as_deref(), true).unwrap();
            let resolved = selector.resolve(&catalog);
            let distinct: HashSet<&str> = resolved.iter().map(|v| v.name.as_str()).collect();
            prop_assert_eq!(distinct.len(), resolved.len());
        }

        /// Property: without force every selected version comes from the catalog
        #[test]
        fn unforced_selection_stays_in_catalog(
            catalog in catalog_strategy(),
            include in prop::collection::vec(pattern_strategy(), 1..4),
        ) {
            let selector = Selector::new(&include, &[], None, false).unwrap();
            for version in selector.resolve(&catalog) {
                prop_assert_eq!(catalog.get(&version.name), Some(&version));
            }
        }

        /// Property: a single include glob keeps catalog order
        #[test]
        fn single_glob_preserves_catalog_order(
            catalog in catalog_strategy(),
            pattern in pattern_strategy(),
        ) {
            let selector = Selector::new(&[pattern.clone()], &[], None, false).unwrap();
            let compiled = Pattern::new(&pattern).unwrap();
            let expected: Vec<&str> = catalog.names().filter(|n| compiled.matches(n)).collect();
            let resolved = selector.resolve(&catalog);
            prop_assert_eq!(
                resolved.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
                expected
            );
        }
    }
}
