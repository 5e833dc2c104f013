//! Endpoint layer tests: identity, URI rendering, groups, selection, refresh.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use hawser_endpoint::*;
    use tokio::time::timeout;

    // ─────────────────────────────────────────────────────────────────────
    // Endpoint identity
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn equality_ignores_weight_and_attributes() {
        let plain = Endpoint::new("example.com", 8080);
        let heavy = Endpoint::new("example.com", 8080)
            .with_weight(7)
            .with_attribute("zone", "eu-1");
        assert_eq!(plain, heavy);

        let mut set = HashSet::new();
        set.insert(plain);
        set.insert(heavy);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn equality_is_host_case_insensitive() {
        let lower = Endpoint::new("example.com", 8080);
        let mixed = Endpoint::new("EXAMPLE.com", 8080);
        assert_eq!(lower, mixed);
        assert_eq!(mixed.host(), "example.com");
    }

    #[test]
    fn different_port_is_a_different_endpoint() {
        assert_ne!(
            Endpoint::new("example.com", 8080),
            Endpoint::new("example.com", 8081)
        );
    }

    #[test]
    fn weight_defaults_to_one() {
        assert_eq!(Endpoint::new("a", 1).weight(), 1);
        assert_eq!(Endpoint::new("a", 1).with_weight(12).weight(), 12);
    }

    #[test]
    fn attribute_lookup() {
        let ep = Endpoint::new("a", 1).with_attribute("zone", "us-2");
        assert_eq!(ep.attribute("zone"), Some("us-2"));
        assert_eq!(ep.attribute("rack"), None);
    }

    #[test]
    fn authority_and_display() {
        let ep = Endpoint::new("example.com", 8080);
        assert_eq!(ep.authority(), "example.com:8080");
        assert_eq!(ep.to_string(), "example.com:8080");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authority parsing
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn parse_authority() {
        let ep = Endpoint::parse("example.com:8080").unwrap();
        assert_eq!(ep.host(), "example.com");
        assert_eq!(ep.port(), 8080);
        assert_eq!(ep.weight(), 1);
    }

    #[test]
    fn parse_rejects_missing_port() {
        assert!(matches!(
            Endpoint::parse("example.com"),
            Err(EndpointParseError::MissingPort(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_host() {
        assert!(matches!(
            Endpoint::parse(":8080"),
            Err(EndpointParseError::EmptyHost(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_port() {
        assert!(matches!(
            Endpoint::parse("example.com:eighty"),
            Err(EndpointParseError::InvalidPort(_))
        ));
        assert!(matches!(
            Endpoint::parse("example.com:99999"),
            Err(EndpointParseError::InvalidPort(_))
        ));
    }

    #[test]
    fn scheme_from_str() {
        assert_eq!("http".parse::<Scheme>().unwrap(), Scheme::Http);
        assert_eq!("https".parse::<Scheme>().unwrap(), Scheme::Https);
        assert!("ws".parse::<Scheme>().is_err());
    }

    // ─────────────────────────────────────────────────────────────────────
    // URI rendering
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn uri_keeps_explicit_port() {
        let ep = Endpoint::new("example.com", 8080);
        assert_eq!(ep.uri(Scheme::Http, "/"), "http://example.com:8080/");
        assert_eq!(
            ep.uri(Scheme::Http, "/v1/items?limit=5"),
            "http://example.com:8080/v1/items?limit=5"
        );
    }

    #[test]
    fn uri_elides_scheme_default_port() {
        assert_eq!(
            Endpoint::new("example.com", 80).uri(Scheme::Http, "/"),
            "http://example.com/"
        );
        assert_eq!(
            Endpoint::new("example.com", 443).uri(Scheme::Https, "/"),
            "https://example.com/"
        );
        // Only the matching scheme's default is elided.
        assert_eq!(
            Endpoint::new("example.com", 443).uri(Scheme::Http, "/"),
            "http://example.com:443/"
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Serde shape
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn endpoint_serializes_without_empty_attributes() {
        let json = serde_json::to_value(Endpoint::new("example.com", 8080)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"host": "example.com", "port": 8080, "weight": 1})
        );
    }

    #[test]
    fn endpoint_deserializes_with_default_weight() {
        let ep: Endpoint =
            serde_json::from_value(serde_json::json!({"host": "example.com", "port": 9000}))
                .unwrap();
        assert_eq!(ep.weight(), 1);
        assert_eq!(ep.port(), 9000);
    }

    #[test]
    fn deserialization_normalizes_host_case() {
        let ep: Endpoint =
            serde_json::from_value(serde_json::json!({"host": "API.Example.COM", "port": 8080}))
                .unwrap();
        assert_eq!(ep.host(), "api.example.com");
        assert_eq!(ep.authority(), "api.example.com:8080");
        assert_eq!(ep.to_string(), "api.example.com:8080");
        assert_eq!(ep, Endpoint::new("api.example.com", 8080));
    }

    // ─────────────────────────────────────────────────────────────────────
    // EndpointGroup selection
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn single_endpoint_group_is_identity() {
        let group = EndpointGroup::of(Endpoint::new("example.com", 8080));
        for _ in 0..5 {
            let selected = group.select(SelectionHint::default()).unwrap();
            assert_eq!(selected, Endpoint::new("example.com", 8080));
        }
        assert_eq!(group.name(), "example.com:8080");
    }

    #[test]
    fn round_robin_group_rotates() {
        let group = EndpointGroup::new(
            "pair",
            vec![Endpoint::new("a", 1), Endpoint::new("b", 1)],
        );
        let first = group.select(SelectionHint::default()).unwrap();
        let second = group.select(SelectionHint::default()).unwrap();
        let third = group.select(SelectionHint::default()).unwrap();
        assert_ne!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn duplicate_endpoints_count_in_rotation() {
        let group = EndpointGroup::new(
            "dupes",
            vec![
                Endpoint::new("a", 1),
                Endpoint::new("a", 1),
                Endpoint::new("b", 1),
            ],
        );
        let picks: Vec<String> = (0..3)
            .map(|_| group.select(SelectionHint::default()).unwrap().to_string())
            .collect();
        assert_eq!(picks, vec!["a:1", "a:1", "b:1"]);
    }

    #[test]
    fn empty_group_selection_fails_with_group_name() {
        let group = EndpointGroup::new("orphans", vec![]);
        let err = group.select(SelectionHint::default()).unwrap_err();
        assert_eq!(err.group, "orphans");
        assert!(err.to_string().contains("orphans"), "{err}");
    }

    #[test]
    fn group_from_bare_endpoint() {
        let group: EndpointGroup = Endpoint::new("example.com", 8080).into();
        assert_eq!(group.len(), 1);
        let shared: Arc<EndpointGroup> = Endpoint::new("example.com", 8080).into();
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn weighted_group_respects_weights() {
        let group = EndpointGroup::with_strategy(
            "weighted",
            vec![
                Endpoint::new("light", 1).with_weight(1),
                Endpoint::new("heavy", 1).with_weight(9),
            ],
            WeightedRandom::new(),
        );
        let mut heavy = 0usize;
        for _ in 0..1000 {
            if group.select(SelectionHint::default()).unwrap().host() == "heavy" {
                heavy += 1;
            }
        }
        assert!(heavy > 700, "heavy endpoint drew only {heavy}/1000 picks");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Refresh and change notification
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn refresh_replaces_membership() {
        let group = EndpointGroup::new("dyn", vec![Endpoint::new("old", 1)]);
        group.set_endpoints(vec![Endpoint::new("new-a", 1), Endpoint::new("new-b", 1)]);
        assert_eq!(group.len(), 2);
        let selected = group.select(SelectionHint::default()).unwrap();
        assert!(selected.host().starts_with("new-"), "selected {selected}");
    }

    #[test]
    fn refresh_to_empty_makes_selection_fail() {
        let group = EndpointGroup::new("draining", vec![Endpoint::new("only", 1)]);
        group.set_endpoints(vec![]);
        assert!(group.select(SelectionHint::default()).is_err());
    }

    #[test]
    fn concurrent_refresh_never_tears_a_snapshot() {
        let group = EndpointGroup::new("flapping", vec![Endpoint::new("a", 1)]);
        let union: HashSet<Endpoint> = [
            Endpoint::new("a", 1),
            Endpoint::new("b", 1),
            Endpoint::new("c", 1),
        ]
        .into_iter()
        .collect();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..200 {
                    if i % 2 == 0 {
                        group.set_endpoints(vec![Endpoint::new("b", 1), Endpoint::new("c", 1)]);
                    } else {
                        group.set_endpoints(vec![Endpoint::new("a", 1)]);
                    }
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        let selected = group.select(SelectionHint::default()).unwrap();
                        assert!(union.contains(&selected), "unexpected endpoint {selected}");
                    }
                });
            }
        });
    }

    #[tokio::test]
    async fn subscribers_observe_refreshes() {
        let group = EndpointGroup::new("watched", vec![Endpoint::new("a", 1)]);
        let mut rx = group.subscribe();
        group.set_endpoints(vec![Endpoint::new("b", 1)]);
        timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("no change notification")
            .unwrap();
        assert_eq!(*rx.borrow(), 1);
    }

    #[tokio::test]
    async fn ready_resolves_once_membership_arrives() {
        let group = Arc::new(EndpointGroup::new("discovered", vec![]));
        assert!(group.is_empty());

        let writer = group.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            writer.set_endpoints(vec![Endpoint::new("found", 4000)]);
        });

        timeout(Duration::from_secs(5), group.ready())
            .await
            .expect("group never became ready");
        assert_eq!(group.len(), 1);
    }

    #[tokio::test]
    async fn ready_is_immediate_for_non_empty_groups() {
        let group = EndpointGroup::of(Endpoint::new("example.com", 8080));
        timeout(Duration::from_millis(100), group.ready())
            .await
            .expect("ready should not block");
    }
}
