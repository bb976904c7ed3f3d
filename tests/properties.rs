//! Property tests for the merge laws cells rely on.

use proptest::prelude::*;

use propnet::config::NetworkConfig;
use propnet::content::interval::Interval;
use propnet::content::supported::Supported;
use propnet::generic::Generics;
use propnet::merge::Contradiction;
use propnet::network::Network;
use propnet::value::Value;

fn arb_interval() -> impl Strategy<Value = Interval> {
    (-1000.0f64..1000.0, 0.0f64..500.0).prop_map(|(low, width)| Interval::new(low, low + width))
}

fn arb_flat() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-1000i32..1000).prop_map(Value::from),
        arb_interval().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn arb_numeric() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-50i32..50).prop_map(Value::from),
        arb_interval().prop_map(Value::from),
    ]
}

fn arb_supported() -> impl Strategy<Value = Value> {
    (arb_numeric(), proptest::sample::subsequence(vec!["shadows", "fall time", "superintendent"], 0..=3))
        .prop_map(|(value, labels)| Value::from(Supported::with_labels(value, labels)))
}

/// Every content type, provenance-tracked values included.
fn arb_content() -> impl Strategy<Value = Value> {
    prop_oneof![arb_flat(), arb_supported()]
}

fn generics() -> Generics {
    Generics::standard().unwrap()
}

proptest! {
    #[test]
    fn nothing_is_the_identity(v in arb_content()) {
        let g = generics();
        prop_assert_eq!(g.merge(&Value::Nothing, &v).unwrap(), v.clone());
        prop_assert_eq!(g.merge(&v, &Value::Nothing).unwrap(), v);
    }

    #[test]
    fn merge_is_idempotent(v in arb_content()) {
        let g = generics();
        prop_assert_eq!(g.merge(&v, &v).unwrap(), v);
    }

    #[test]
    fn merge_commutes_up_to_contradiction(a in arb_numeric(), b in arb_numeric()) {
        let g = generics();
        let ab = g.merge(&a, &b).unwrap();
        let ba = g.merge(&b, &a).unwrap();
        let ab_bad = g.is_contradictory(&ab).unwrap();
        prop_assert_eq!(ab_bad, g.is_contradictory(&ba).unwrap());
        if !ab_bad {
            prop_assert_eq!(ab, ba);
        }
    }

    #[test]
    fn contradictions_absorb(v in arb_content()) {
        let g = generics();
        let bad = Value::from(Contradiction::new("inconsistent"));
        prop_assert_eq!(g.merge(&bad, &v).unwrap(), bad.clone());
        prop_assert_eq!(g.merge(&v, &bad).unwrap(), bad);
    }

    #[test]
    fn interval_merge_only_narrows(a in arb_interval(), b in arb_interval()) {
        let g = generics();
        let merged = g.merge(&Value::from(a), &Value::from(b)).unwrap();
        match merged.as_interval() {
            Some(range) => {
                prop_assert!(range.is_within(&a));
                prop_assert!(range.is_within(&b));
            }
            None => prop_assert!(a.intersect(&b).is_empty()),
        }
    }

    #[test]
    fn merged_content_implies_both_inputs(a in arb_interval(), b in arb_interval()) {
        let g = generics();
        let (a, b) = (Value::from(a), Value::from(b));
        let merged = g.merge(&a, &b).unwrap();
        if !g.is_contradictory(&merged).unwrap() {
            prop_assert!(g.implies(&merged, &a).unwrap());
            prop_assert!(g.implies(&merged, &b).unwrap());
        }
    }

    #[test]
    fn known_content_does_not_realert(v in arb_flat()) {
        let mut net = Network::new(NetworkConfig::default()).unwrap();
        let cell = net.new_cell("x");
        net.propagator(&[cell], |_| Ok(())).unwrap();
        net.add_content(cell, v.clone()).unwrap();
        net.run().unwrap();
        net.add_content(cell, v).unwrap();
        prop_assert_eq!(net.pending_count(), 0);
    }
}
