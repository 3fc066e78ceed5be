use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::{tempdir, NamedTempFile, TempDir};

use icntopo::candidates::CandidatePolicy;
use icntopo::config_loader::load_config;
use icntopo::error::TopologyError;
use icntopo::registry::{BuildContext, Params, Registry, TopologyRequest};
use icntopo::topology::{LinkType, NodeId, Role, Topology, TopologyBuilder};

fn build(request: &TopologyRequest, root: &Path) -> Result<Topology, TopologyError> {
    Registry::global().build_request(request, &BuildContext::new(root))
}

/// Checks every generated topology must pass
fn assert_invariants(t: &Topology) {
    for node in t.graph().nodes() {
        assert!(node.role().is_some(), "{}: {} has no role", t.name(), node.id);
    }
    assert!(!t.sources().is_empty(), "{}: no source", t.name());
    assert!(!t.receivers().is_empty(), "{}: no receiver", t.name());
    let routers = t.routers();
    assert!(t.icr_candidates().is_subset(&routers), "{}: candidate is not a router", t.name());
    for (u, v, link) in t.graph().edges() {
        assert!(link.weight > 0.0, "{}: weight of {}-{}", t.name(), u, v);
        assert!(link.delay >= 0.0, "{}: delay of {}-{}", t.name(), u, v);
    }
    for source in t.sources() {
        for n in t.graph().neighbors(&source) {
            assert_eq!(t.link_type(&source, n), Some(LinkType::External));
        }
    }
}

fn write(dir: &TempDir, name: &str, content: &str) {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_synthetic_families_hold_invariants() {
    let requests = [
        TopologyRequest::new("PATH").param("n", 6),
        TopologyRequest::new("TREE").param("k", 3).param("h", 3),
        TopologyRequest::new("TREE-EDGE").param("k", 5),
        TopologyRequest::new("TREE-COOR-EDGE").param("k", 2).param("h", 4),
        TopologyRequest::new("RING").param("n", 7),
        TopologyRequest::new("MESH").param("n", 5).param("m", 5),
        TopologyRequest::new("SINET"),
        TopologyRequest::new("SINET-EDGE"),
        TopologyRequest::new("ATREE"),
        TopologyRequest::new("EATREE"),
        TopologyRequest::new("CEATREE"),
        TopologyRequest::new("NCEATREE"),
    ];
    let root = Path::new("unused");
    for request in &requests {
        let t = build(request, root).unwrap();
        assert_invariants(&t);
        assert!(t.graph().is_connected(), "{} is disconnected", t.name());
    }
}

#[test]
fn test_builds_are_deterministic() {
    let request = TopologyRequest::new("TREE").param("k", 3).param("h", 3);
    let mut betweenness = request.clone();
    betweenness.candidates = Some(CandidatePolicy::TopPercentileBetweenness { fraction: 0.3 });

    for r in [&request, &betweenness] {
        let a = build(r, Path::new(".")).unwrap();
        let b = build(r, Path::new(".")).unwrap();
        assert_eq!(a.icr_candidates(), b.icr_candidates());
        let ja = serde_json::to_string(&a.snapshot()).unwrap();
        let jb = serde_json::to_string(&b.snapshot()).unwrap();
        assert_eq!(ja, jb);
    }
}

#[test]
fn test_betweenness_survives_order_preserving_relabel() {
    // two triangles joined by a bridge, with a tail
    let edges = [(0u64, 1u64), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3), (5, 6), (6, 7)];
    let relabel = |n: u64| n * 10 + 5;

    let assemble = |map: &dyn Fn(u64) -> u64| {
        let mut b = TopologyBuilder::new("relabel");
        for &(u, v) in &edges {
            b.graph_mut().add_edge(map(u), map(v)).unwrap();
        }
        b.graph_mut().add_edge(map(0), 1000u64).unwrap();
        b.graph_mut().add_edge(map(7), 2000u64).unwrap();
        b.assign_role(1000u64, Role::Receiver).unwrap();
        b.assign_role(2000u64, Role::Source).unwrap();
        b.assign_remaining(Role::Router).unwrap();
        b.finish(&CandidatePolicy::TopPercentileBetweenness { fraction: 0.5 }).unwrap()
    };

    let original = assemble(&|n| n);
    let relabeled = assemble(&relabel);
    assert_eq!(original.icr_candidates().len(), 4);

    let mapped: BTreeSet<NodeId> = original
        .icr_candidates()
        .iter()
        .map(|id| NodeId::Num(relabel(id.as_num().unwrap())))
        .collect();
    assert_eq!(&mapped, relabeled.icr_candidates());
}

#[test]
fn test_degree_threshold_is_monotonic() {
    let t = build(&TopologyRequest::new("SINET"), Path::new(".")).unwrap();
    let mut previous: Option<BTreeSet<NodeId>> = None;
    for min_degree in 0..20 {
        let selected = CandidatePolicy::DegreeThreshold { min_degree }
            .select(t.graph())
            .unwrap();
        if let Some(prev) = &previous {
            assert!(selected.is_subset(prev));
        }
        previous = Some(selected);
    }
}

#[test]
fn test_rocket_fuel_from_resources() {
    let dir = tempdir().unwrap();
    let latencies = "\
Seattle,+WA1 Chicago,+IL3 12.5
Chicago,+IL3 NewYork,+NY2 9
Seattle,+WA1 Denver,+CO1 6
Denver,+CO1 Chicago,+IL3 4
";
    let path = dir.path().join("rocketfuel-latency/1221/latencies.intra");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, latencies).unwrap();

    let request = TopologyRequest::new("ROCKET_FUEL")
        .param("as_identifier", 1221)
        .param("source_ratio", 0.5);
    let t = Registry::global()
        .build_request(&request, &BuildContext::new(dir.path()))
        .unwrap();
    assert_invariants(&t);
    assert_eq!(t.routers().len(), 4);
    assert_eq!(t.sources().len(), 2);
    assert_eq!(t.receivers().len(), 4);
    let chicago = NodeId::parse("Chicago,+IL3");
    let seattle = NodeId::parse("Seattle,+WA1");
    assert_eq!(t.delay(&seattle, &chicago), Some(12.5));
    assert_eq!(t.weight(&seattle, &chicago), Some(12.5));

    let missing = TopologyRequest::new("ROCKET_FUEL").param("asn", 7018);
    let err = Registry::global()
        .build_request(&missing, &BuildContext::new(dir.path()))
        .unwrap_err();
    assert!(matches!(err, TopologyError::Io { .. }));
}

#[test]
fn test_backbone_from_gml() {
    let dir = tempdir().unwrap();
    write(
        &dir,
        "Mini.gml",
        r#"
Creator "topology-zoo"
graph [
  directed 0
  node [ id 0 label "Rome" ]
  node [ id 1 label "Milan" ]
  node [ id 2 label "Bari" ]
  node [ id 3 label "Turin" ]
  node [ id 4 label "Lonely" ]
  edge [ source 0 target 1 ]
  edge [ source 0 target 2 ]
  edge [ source 1 target 3 ]
]
"#,
    );

    let all = build(&TopologyRequest::new("BACKBONE").param("file", "Mini.gml"), dir.path()).unwrap();
    assert_invariants(&all);
    assert_eq!(all.sources().into_iter().collect::<Vec<_>>(), vec![NodeId::Num(1000)]);
    assert_eq!(all.receivers().len(), 4);
    assert!(all.role(&NodeId::Num(4)).is_none());

    let leaves = build(
        &TopologyRequest::new("BACKBONE")
            .param("file", "Mini.gml")
            .param("receivers", "leaves")
            .param("delay", 3),
        dir.path(),
    )
    .unwrap();
    assert_eq!(
        leaves.receivers(),
        [NodeId::Num(2002), NodeId::Num(2003)].into_iter().collect::<BTreeSet<_>>()
    );
    assert_eq!(leaves.delay(&NodeId::Num(0), &NodeId::Num(2)), Some(3.0));

    let bad = build(
        &TopologyRequest::new("BACKBONE").param("file", "Mini.gml").param("receivers", "some"),
        dir.path(),
    );
    assert!(matches!(bad, Err(TopologyError::Configuration(_))));
}

#[test]
fn test_huge_dataset_ids_fail_cleanly() {
    let dir = tempdir().unwrap();
    write(
        &dir,
        "Huge.gml",
        "graph [\n  node [ id 0 ]\n  node [ id 1000000000000000000 ]\n  edge [ source 0 target 1000000000000000000 ]\n]\n",
    );
    let backbone = build(&TopologyRequest::new("BACKBONE").param("file", "Huge.gml"), dir.path());
    assert!(matches!(backbone, Err(TopologyError::MalformedTopology(_))));

    write(
        &dir,
        "huge.json",
        r#"{"connections": [
            {"source_id": 1000000000000000000, "destination_id": 1},
            {"source_id": 1, "destination_id": 2}
        ]}"#,
    );
    let random = build(&TopologyRequest::new("RANDOM3").param("file", "huge.json"), dir.path());
    assert!(matches!(random, Err(TopologyError::MalformedTopology(_))));

    // one order of magnitude less still fits
    write(
        &dir,
        "big.json",
        r#"{"connections": [
            {"source_id": 100000000000000000, "destination_id": 1},
            {"source_id": 1, "destination_id": 2}
        ]}"#,
    );
    let t = build(&TopologyRequest::new("RANDOM3").param("file", "big.json"), dir.path()).unwrap();
    assert_invariants(&t);
    assert!(t.sources().contains(&NodeId::Num(10_000_000_000_000_000_000)));
}

#[test]
fn test_telstra_variants() {
    let dir = tempdir().unwrap();
    write(
        &dir,
        "telstra.txt",
        "# tiers\nbb-1 bb-2\nbb-1 gw-1\ngw-1 leaf-1\ngw-1 leaf-2\nbb-2 gw-2\ngw-2 leaf-3\n",
    );
    let request = |name: &str| {
        TopologyRequest::new(name)
            .param("file", "telstra.txt")
            .param("source_attachment", "bb-1")
    };

    let all = build(&request("TELSTRA"), dir.path()).unwrap();
    assert_invariants(&all);
    assert_eq!(all.routers().len(), 7);
    assert_eq!(all.receivers().len(), 3);
    assert!(all.link(&NodeId::Num(2000), &NodeId::from("bb-1")).is_some());

    let edge = build(&request("TELSTRA-EDGE"), dir.path()).unwrap();
    assert_eq!(edge.gateways().len(), 4);
    assert_eq!(edge.icr_candidates().len(), 3);

    let coor = build(&request("TELSTRA-COOR-EDGE"), dir.path()).unwrap();
    assert_eq!(coor.gateways().len(), 2);

    let wrong = request("TELSTRA").param("source_attachment", "bb-9");
    assert!(matches!(build(&wrong, dir.path()), Err(TopologyError::Configuration(_))));

    write(&dir, "odd.txt", "bb-1 core-7\nbb-1 leaf-1\n");
    let odd = build(&request("TELSTRA").param("file", "odd.txt"), dir.path()).unwrap_err();
    assert!(matches!(odd, TopologyError::MissingRole { ref nodes } if nodes == &[NodeId::from("core-7")]));
}

#[test]
fn test_random_connection_lists() {
    let dir = tempdir().unwrap();
    write(
        &dir,
        "random_1.json",
        r#"{"connections": [
            {"source_id": 0, "destination_id": 1},
            {"source_id": 0, "destination_id": 2},
            {"source_id": 0, "destination_id": 3},
            {"source_id": 3, "destination_id": 4}
        ]}"#,
    );

    let single = TopologyRequest::new("RANDOM").param("source_degree", 3);
    let t = build(&single, dir.path()).unwrap();
    assert_invariants(&t);
    assert_eq!(t.sources().len(), 1);
    assert_eq!(t.receivers().len(), 5);
    let source = t.sources().into_iter().next().unwrap();
    assert_eq!(t.graph().neighbors(&source).collect::<Vec<_>>(), vec![&NodeId::Num(0)]);

    let everywhere = TopologyRequest::new("RANDOM3").param("file", "random_1.json");
    let t = build(&everywhere, dir.path()).unwrap();
    assert_eq!(t.sources().len(), 5);

    let nowhere = TopologyRequest::new("RANDOM").param("source_degree", 7);
    assert!(matches!(build(&nowhere, dir.path()), Err(TopologyError::Configuration(_))));

    // repeated lines count toward the source degree
    write(
        &dir,
        "repeats.json",
        r#"{"connections": [
            {"source_id": 0, "destination_id": 1},
            {"source_id": 0, "destination_id": 1},
            {"source_id": 0, "destination_id": 2},
            {"source_id": 2, "destination_id": 3},
            {"source_id": 3, "destination_id": 4},
            {"source_id": 3, "destination_id": 5},
            {"source_id": 3, "destination_id": 6}
        ]}"#,
    );
    let repeats = TopologyRequest::new("RANDOM")
        .param("file", "repeats.json")
        .param("source_degree", 3);
    let t = build(&repeats, dir.path()).unwrap();
    let source = t.sources().into_iter().next().unwrap();
    assert_eq!(t.graph().neighbors(&source).collect::<Vec<_>>(), vec![&NodeId::Num(0)]);
}

#[test]
fn test_generated_random_list_builds() {
    let dir = tempdir().unwrap();
    let list = icntopo::parsers::ConnectionList::random(40, 0.15, 11).unwrap();
    list.save(&dir.path().join("random_750.json")).unwrap();

    let t = build(&TopologyRequest::new("RANDOM3"), dir.path()).unwrap();
    assert_invariants(&t);
    assert_eq!(t.routers().len(), 40);
}

#[test]
fn test_experiment_file_end_to_end() {
    let dir = tempdir().unwrap();
    write(&dir, "ring.txt", "1 2 1\n2 3 1\n3 1 1\n");

    let yaml = format!(
        r#"
resources: {}
topology:
  name: BACKBONE
  file: ring.txt
  candidates:
    policy: explicit_list
    base: [1, 2]
    removals: [2]
    additions: [3]
"#,
        dir.path().display()
    );
    let mut config_file = NamedTempFile::new().unwrap();
    write!(config_file, "{}", yaml).unwrap();

    let config = load_config(config_file.path()).unwrap();
    let t = Registry::global()
        .build_request(&config.topology, &config.build_context())
        .unwrap();
    let expected: BTreeSet<NodeId> = [NodeId::Num(1), NodeId::Num(3)].into_iter().collect();
    assert_eq!(t.icr_candidates(), &expected);
}

#[test]
fn test_cache_assignment() {
    let mut t = build(&TopologyRequest::new("PATH").param("n", 4), Path::new(".")).unwrap();
    t.assign_cache(&NodeId::Num(1), 100).unwrap();
    assert_eq!(t.cache_nodes().get(&NodeId::Num(1)), Some(&100));

    let err = t.assign_cache(&NodeId::Num(0), 100).unwrap_err();
    assert!(matches!(err, TopologyError::InvalidCandidate { .. }));
    t.clear_caches();
    assert!(t.cache_nodes().is_empty());
}

#[test]
fn test_every_family_declares_usable_params() {
    for factory in Registry::global().factories() {
        if Params::all_defaulted(factory.params) {
            assert!(Params::resolve(factory.name, factory.params, &BTreeMap::new()).is_ok());
        }
        for param in factory.params {
            assert!(!param.help.is_empty(), "{}.{} has no help", factory.name, param.name);
        }
    }
}
