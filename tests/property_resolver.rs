// tests/property_resolver.rs

use std::collections::HashSet;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use waxwatch::engine::{BuildRequest, SchedulerCore};
use waxwatch::graph::{Page, Settings};
use waxwatch::resolve::{Classification, Resolver};
use waxwatch::types::ActionKind;
use waxwatch_test_utils::builders::{PageBuilder, SettingsBuilder};

const KEYS: [&str; 6] = ["home/hero", "home/news", "shared/header", "about/team", "contact/form", "blog/list"];

// Pages draw their (view, data) pairs from a small key pool so that keys are
// shared between pages often.
fn settings_strategy() -> impl Strategy<Value = Settings> {
    proptest::collection::vec(
        proptest::collection::vec((0..KEYS.len(), 0..KEYS.len(), 0..2usize), 0..4),
        1..6,
    )
    .prop_map(|pages| {
        pages
            .into_iter()
            .enumerate()
            .fold(SettingsBuilder::new("/site"), |builder, (i, contents)| {
                let page = contents.into_iter().fold(
                    PageBuilder::new(&format!("Page {i}")),
                    |page, (view, data, slot)| {
                        let slot = if slot == 0 { "content" } else { "header" };
                        page.content(slot, KEYS[view], KEYS[data])
                    },
                );
                builder.page(page.build())
            })
            .build()
    })
}

fn names(pages: &[Page]) -> Vec<String> {
    pages.iter().map(|p| p.name().to_string()).collect()
}

proptest! {
    #[test]
    fn paths_outside_the_layout_are_irrelevant(
        rel in "src(/[a-z]{1,8}){1,3}\\.(json|mustache|scss|coffee)"
    ) {
        let settings = SettingsBuilder::new("/site").build();
        prop_assert_eq!(
            Resolver::default().classify_relative(&settings, &rel),
            Classification::Irrelevant
        );
    }

    #[test]
    fn data_change_affects_exactly_the_referencing_pages(
        settings in settings_strategy(),
        key in 0..KEYS.len(),
    ) {
        let key = KEYS[key];
        let resolver = Resolver::default();

        let classification = resolver.classify_relative(&settings, &format!("wax/data/{key}.json"));
        prop_assert_eq!(
            &classification,
            &Classification::DataChanged { key: key.to_string() }
        );

        let expected: Vec<String> = settings
            .pages()
            .iter()
            .filter(|page| page.iter_contents().any(|(_, c)| c.data_path() == key))
            .map(|page| page.name().to_string())
            .collect();
        prop_assert_eq!(names(&resolver.affected_pages(&settings, &classification)), expected);
    }

    #[test]
    fn view_change_affects_exactly_the_referencing_pages(
        settings in settings_strategy(),
        key in 0..KEYS.len(),
    ) {
        let key = KEYS[key];
        let resolver = Resolver::default();

        let classification = resolver.classify_relative(&settings, &format!("Views/{key}.mustache"));
        let expected: Vec<String> = settings
            .pages()
            .iter()
            .filter(|page| page.iter_contents().any(|(_, c)| c.view_path() == key))
            .map(|page| page.name().to_string())
            .collect();
        prop_assert_eq!(names(&resolver.affected_pages(&settings, &classification)), expected);
    }

    #[test]
    fn queue_holds_one_entry_per_kind_in_first_arrival_order(
        kinds in proptest::collection::vec(0..ActionKind::ALL.len(), 0..40),
    ) {
        let mut core = SchedulerCore::new();
        let mut expected = Vec::new();
        let mut seen = HashSet::new();

        for (i, k) in kinds.iter().enumerate() {
            let kind = ActionKind::ALL[*k];
            let request = match kind {
                ActionKind::Pages => BuildRequest::pages(
                    format!("/site/wax/data/{i}.json"),
                    vec![Page::new(format!("Page {i}"))],
                ),
                other => BuildRequest::new(other, format!("/site/file{i}")),
            };
            core.enqueue(request);
            if seen.insert(kind) {
                expected.push(kind);
            }
        }

        prop_assert_eq!(core.pending_actions(), expected.clone());

        // Draining hands requests out one at a time in the same order.
        let mut drained = Vec::new();
        while let Some(request) = core.begin_next(Instant::now(), Duration::ZERO) {
            prop_assert!(core.begin_next(Instant::now(), Duration::ZERO).is_none());
            drained.push(request.action);
            core.finish(&request, &waxwatch::engine::ActionReport::success());
        }
        prop_assert_eq!(drained, expected);
    }
}
