use clusterplan::graph::alg::{face_cycle, faces};
use clusterplan::graph::{AdjId, EdgeId, Graph, NodeId};
use clusterplan::{
    BoundaryOptions, ClusterPlanRep, ClusteredGraph, ClusteredGraphSpec, Error, ErrorKind,
};
use serde_json::json;

fn build(value: serde_json::Value) -> ClusteredGraph {
    let spec: ClusteredGraphSpec = serde_json::from_value(value).unwrap();
    spec.build().unwrap()
}

const CHECKED: BoundaryOptions = BoundaryOptions {
    check_embedding: true,
};

fn touches(g: &Graph, face: &[AdjId], v: NodeId) -> bool {
    face.iter().any(|&h| g.twin_node(h) == v)
}

/// An entry at `v` whose following corner lies on `face`.
fn corner_on(g: &Graph, face: &[AdjId], v: NodeId) -> AdjId {
    let h = face
        .iter()
        .copied()
        .find(|&h| g.twin_node(h) == v)
        .expect("face does not touch node");
    g.twin(h)
}

/// Path from `s` to `t` crossing the copy edges `crossed` in order, starting in the face at `s`
/// that borders the first crossed edge.
fn route(g: &Graph, s: NodeId, t: NodeId, crossed: &[EdgeId]) -> Vec<AdjId> {
    let borders = |face: &[AdjId], e: EdgeId| {
        face.contains(&g.adj_source(e)) || face.contains(&g.adj_target(e))
    };
    let mut face = faces(g)
        .into_iter()
        .find(|f| touches(g, f, s) && borders(f, crossed[0]))
        .expect("no face at the source borders the first crossed edge");

    let mut path = vec![corner_on(g, &face, s)];
    for &e in crossed {
        let h = if face.contains(&g.adj_source(e)) {
            g.adj_source(e)
        } else {
            g.adj_target(e)
        };
        path.push(h);
        face = face_cycle(g, g.twin(h));
    }
    path.push(corner_on(g, &face, t));
    path
}

fn copy_of(cpr: &ClusterPlanRep<'_>, input: &ClusteredGraph, name: &str) -> NodeId {
    cpr.plan_rep().copy(input.node(name).unwrap()).unwrap()
}

/// Crossing nodes of the chain of `e`, in path order.
fn crossings(cpr: &ClusterPlanRep<'_>, e: EdgeId) -> Vec<NodeId> {
    let chain = cpr.plan_rep().chain(e);
    chain[..chain.len() - 1]
        .iter()
        .map(|&seg| cpr.graph().target(seg))
        .collect()
}

/// P holds A = {a1, a2}, B = {b1, b2} and the nodes p1, p2 directly; r lies outside P. The
/// edge p1 - p2 runs between A and B and crosses a1 - b1 and a2 - b2 there.
fn siblings_in_parent() -> ClusteredGraph {
    build(json!({
        "nodes": [
            { "id": "a1", "x": 0, "y": 1, "cluster": "A" },
            { "id": "a2", "x": 0, "y": -1, "cluster": "A" },
            { "id": "b1", "x": 4, "y": 1, "cluster": "B" },
            { "id": "b2", "x": 4, "y": -1, "cluster": "B" },
            { "id": "p1", "x": 2, "y": 3, "cluster": "P" },
            { "id": "p2", "x": 2, "y": -3, "cluster": "P" },
            { "id": "r", "x": 8, "y": 0 }
        ],
        "edges": [
            { "source": "a1", "target": "a2" },
            { "source": "b1", "target": "b2" },
            { "source": "a1", "target": "b1" },
            { "source": "a2", "target": "b2" },
            { "source": "p1", "target": "a1" },
            { "source": "p2", "target": "a2" },
            { "source": "p1", "target": "p2" },
            { "source": "b1", "target": "r" }
        ],
        "clusters": [
            { "id": "P" },
            { "id": "A", "parent": "P" },
            { "id": "B", "parent": "P" }
        ]
    }))
}

/// The chain segment of `e` running between the boundary nodes of clusters `i` and `j`.
fn segment_between(cpr: &ClusterPlanRep<'_>, e: EdgeId, i: usize, j: usize) -> EdgeId {
    let g = cpr.graph();
    cpr.plan_rep()
        .chain(e)
        .iter()
        .copied()
        .find(|&seg| {
            let ids = (cpr.cluster_id(g.source(seg)), cpr.cluster_id(g.target(seg)));
            ids == (Some(i), Some(j)) || ids == (Some(j), Some(i))
        })
        .expect("no such segment")
}

#[test]
fn crossing_between_sibling_boundaries_belongs_to_their_parent() {
    let input = siblings_in_parent();
    let (p, a, b) = (
        input.clusters.index(input.cluster("P").unwrap()),
        input.clusters.index(input.cluster("A").unwrap()),
        input.clusters.index(input.cluster("B").unwrap()),
    );
    let routed = input.edge_between("p1", "p2").unwrap();

    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();
    cpr.remove_edge_path_embedded(routed);
    cpr.model_boundaries_with(&CHECKED).unwrap();
    assert_eq!(cpr.graph().node_count(), 15);

    let upper = segment_between(&cpr, input.edge_between("a1", "b1").unwrap(), a, b);
    let lower = segment_between(&cpr, input.edge_between("a2", "b2").unwrap(), a, b);
    let path = route(
        cpr.graph(),
        copy_of(&cpr, &input, "p1"),
        copy_of(&cpr, &input, "p2"),
        &[upper, lower],
    );
    cpr.insert_edge_path_embedded(routed, &path).unwrap();

    assert!(cpr.represents_comb_embedding());
    let xs = crossings(&cpr, routed);
    assert_eq!(xs.len(), 2);
    for &x in &xs {
        assert_eq!(cpr.graph().degree(x), 4);
        assert_eq!(cpr.cluster_id(x), Some(p));
    }

    // Resolution is read-only and repeatable.
    let seg = cpr.plan_rep().chain(routed)[0];
    let adj_in = cpr.graph().adj_target(seg);
    assert_eq!(cpr.resolve_crossing(adj_in).unwrap(), p);
    assert_eq!(cpr.resolve_crossing(adj_in).unwrap(), p);
    assert_eq!(cpr.cluster_id(xs[0]), Some(p));
}

#[test]
fn crossing_next_to_an_original_takes_the_original_cluster() {
    let input = build(json!({
        "nodes": [
            { "id": "a1", "x": 0, "y": 1, "cluster": "A" },
            { "id": "a2", "x": 0, "y": -1, "cluster": "A" },
            { "id": "p1", "x": -3, "y": 0, "cluster": "P" },
            { "id": "p2", "x": -2, "y": 2, "cluster": "P" },
            { "id": "p3", "x": -2, "y": -2, "cluster": "P" },
            { "id": "r1", "x": 5, "y": 1 },
            { "id": "r2", "x": 5, "y": -1 }
        ],
        "edges": [
            { "source": "a1", "target": "a2" },
            { "source": "p1", "target": "a1" },
            { "source": "p1", "target": "a2" },
            { "source": "a1", "target": "r1" },
            { "source": "r2", "target": "a2" },
            { "source": "r1", "target": "r2" },
            { "source": "p2", "target": "p3" },
            { "source": "p2", "target": "a1" },
            { "source": "p3", "target": "a2" }
        ],
        "clusters": [{ "id": "P" }, { "id": "A", "parent": "P" }]
    }));
    let p = input.clusters.index(input.cluster("P").unwrap());
    let routed = input.edge_between("p2", "p3").unwrap();

    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();
    cpr.remove_edge_path_embedded(routed);
    cpr.model_boundaries_with(&CHECKED).unwrap();

    // The segments p1 -> (boundary of A) on both edges from p1.
    let upper = cpr.plan_rep().chain(input.edge_between("p1", "a1").unwrap())[0];
    let lower = cpr.plan_rep().chain(input.edge_between("p1", "a2").unwrap())[0];
    let path = route(
        cpr.graph(),
        copy_of(&cpr, &input, "p2"),
        copy_of(&cpr, &input, "p3"),
        &[upper, lower],
    );
    cpr.insert_edge_path_embedded(routed, &path).unwrap();

    assert!(cpr.represents_comb_embedding());
    let ids: Vec<Option<usize>> = crossings(&cpr, routed)
        .into_iter()
        .map(|x| cpr.cluster_id(x))
        .collect();
    assert_eq!(ids, vec![Some(p), Some(p)]);
}

fn diamond(clusters: [Option<&str>; 4]) -> ClusteredGraph {
    let [ca, cb, cc, cd] = clusters;
    build(json!({
        "nodes": [
            { "id": "a", "x": -1, "y": 0, "cluster": ca },
            { "id": "b", "x": 1, "y": 0, "cluster": cb },
            { "id": "c", "x": 0, "y": 1, "cluster": cc },
            { "id": "d", "x": 0, "y": -1, "cluster": cd }
        ],
        "edges": [
            { "source": "a", "target": "c" },
            { "source": "c", "target": "b" },
            { "source": "b", "target": "d" },
            { "source": "d", "target": "a" },
            { "source": "a", "target": "b" },
            { "source": "c", "target": "d" }
        ],
        "clusters": [{ "id": "A" }]
    }))
}

fn route_cd_across_ab(
    cpr: &mut ClusterPlanRep<'_>,
    input: &ClusteredGraph,
) -> clusterplan::Result<()> {
    let cd = input.edge_between("c", "d").unwrap();
    let ab = cpr.plan_rep().copy_edge(input.edge_between("a", "b").unwrap())?;
    let path = route(
        cpr.graph(),
        copy_of(cpr, input, "c"),
        copy_of(cpr, input, "d"),
        &[ab],
    );
    cpr.insert_edge_path_embedded(cd, &path)
}

#[test]
fn crossing_between_two_originals_of_one_cluster_joins_it() {
    let input = diamond([Some("A"); 4]);
    let a = input.clusters.index(input.cluster("A").unwrap());
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();
    cpr.remove_edge_path_embedded(input.edge_between("c", "d").unwrap());
    cpr.model_boundaries_with(&CHECKED).unwrap();
    assert_eq!(cpr.graph().node_count(), 4);

    route_cd_across_ab(&mut cpr, &input).unwrap();

    let xs = crossings(&cpr, input.edge_between("c", "d").unwrap());
    assert_eq!(xs.len(), 1);
    assert_eq!(cpr.cluster_id(xs[0]), Some(a));
    let pieces = cpr.plan_rep().chain(input.edge_between("a", "b").unwrap());
    assert_eq!(pieces.len(), 2);
    assert!(pieces.iter().all(|&e| cpr.edge_cluster_id(e) == Some(a)));
    assert!(cpr.represents_comb_embedding());
}

#[test]
fn crossed_edge_between_clusters_is_a_structural_inconsistency() {
    let input = diamond([Some("A"), None, None, None]);
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();
    cpr.remove_edge_path_embedded(input.edge_between("c", "d").unwrap());

    let err = route_cd_across_ab(&mut cpr, &input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralInconsistency);
    assert!(matches!(err, Error::AlgorithmFailure { .. }));

    // The failed route is taken out again.
    let g = cpr.graph();
    assert!(cpr.plan_rep().chain(input.edge_between("c", "d").unwrap()).is_empty());
    assert_eq!(cpr.plan_rep().chain(input.edge_between("a", "b").unwrap()).len(), 1);
    assert_eq!(g.node_count(), 4);
    assert_eq!(g.edge_count(), 5);
    assert!(g.nodes().all(|v| cpr.cluster_id(v).is_some()));
    assert!(cpr.represents_comb_embedding());
    assert!(g.contains_adj(cpr.root_adj().unwrap()));
}

#[test]
fn resolving_at_a_non_crossing_node_is_a_precondition_violation() {
    let input = diamond([None; 4]);
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();

    let a = copy_of(&cpr, &input, "a");
    let adj = cpr.graph().first_adj(a).unwrap();
    let err = cpr.resolve_crossing(adj).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(matches!(err, Error::CrossingDegree { degree: 3, .. }));
}

#[test]
fn fresh_split_node_has_no_cluster_yet() {
    let input = diamond([None; 4]);
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();

    let ab = cpr
        .plan_rep()
        .copy_edge(input.edge_between("a", "b").unwrap())
        .unwrap();
    let e2 = cpr.split(ab);
    let x = cpr.graph().source(e2);
    assert_eq!(cpr.cluster_id(x), None);
    assert_eq!(cpr.edge_cluster_id(e2), Some(0));

    let err = cpr.cluster_of_dummy(x).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(matches!(err, Error::UnsetClusterId { node } if node == x));
}

#[test]
fn routed_edge_inserted_twice_is_rejected() {
    let input = diamond([None; 4]);
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();

    let cd = input.edge_between("c", "d").unwrap();
    let chain = cpr.plan_rep().chain(cd).to_vec();
    let g = cpr.graph();
    let path = [g.adj_source(chain[0]), g.adj_target(chain[0])];
    let err = cpr.insert_edge_path_embedded(cd, &path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(matches!(
        err,
        Error::Graph(clusterplan::graph::Error::EdgeAlreadyRepresented { .. })
    ));
}

/// Rungs a1 - a2 (in `left`) and p1 - p2 (in `right`) of a ladder, with P holding A. The edge
/// h1 - h2 crosses both rungs, and t1 - t2 crosses h1 - h2 between them.
fn ladder(left: Option<&str>, right: Option<&str>) -> ClusteredGraph {
    build(json!({
        "nodes": [
            { "id": "a1", "x": 0, "y": 1, "cluster": left },
            { "id": "a2", "x": 0, "y": -1, "cluster": left },
            { "id": "p1", "x": 2, "y": 1, "cluster": right },
            { "id": "p2", "x": 2, "y": -1, "cluster": right },
            { "id": "h1", "x": -1, "y": 0 },
            { "id": "h2", "x": 3, "y": 0 },
            { "id": "t1", "x": 1, "y": 0.5 },
            { "id": "t2", "x": 1, "y": -0.5 }
        ],
        "edges": [
            { "source": "a1", "target": "a2" },
            { "source": "p1", "target": "p2" },
            { "source": "a1", "target": "p1" },
            { "source": "a2", "target": "p2" },
            { "source": "h1", "target": "a1" },
            { "source": "h2", "target": "p1" },
            { "source": "t1", "target": "a1" },
            { "source": "t2", "target": "a2" },
            { "source": "h1", "target": "h2" },
            { "source": "t1", "target": "t2" }
        ],
        "clusters": [{ "id": "P" }, { "id": "A", "parent": "P" }]
    }))
}

/// Routes h1 - h2 across both rungs and then t1 - t2 across the segment between the rungs.
/// Returns the chain of t1 - t2.
fn cross_ladder(
    cpr: &mut ClusterPlanRep<'_>,
    input: &ClusteredGraph,
) -> clusterplan::Result<Vec<EdgeId>> {
    let horizontal = input.edge_between("h1", "h2").unwrap();
    let vertical = input.edge_between("t1", "t2").unwrap();
    cpr.remove_edge_path_embedded(horizontal);
    cpr.remove_edge_path_embedded(vertical);

    let rungs = [
        cpr.plan_rep().copy_edge(input.edge_between("a1", "a2").unwrap())?,
        cpr.plan_rep().copy_edge(input.edge_between("p1", "p2").unwrap())?,
    ];
    let path = route(
        cpr.graph(),
        copy_of(cpr, input, "h1"),
        copy_of(cpr, input, "h2"),
        &rungs,
    );
    cpr.insert_edge_path_embedded(horizontal, &path)?;

    let between = cpr.plan_rep().chain(horizontal)[1];
    let path = route(
        cpr.graph(),
        copy_of(cpr, input, "t1"),
        copy_of(cpr, input, "t2"),
        &[between],
    );
    cpr.insert_edge_path_embedded(vertical, &path)?;
    Ok(cpr.plan_rep().chain(vertical).to_vec())
}

#[test]
fn crossing_between_child_and_parent_dummies_takes_the_parent() {
    let input = ladder(Some("A"), Some("P"));
    let p = input.clusters.index(input.cluster("P").unwrap());
    let a = input.clusters.index(input.cluster("A").unwrap());
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();

    let chain = cross_ladder(&mut cpr, &input).unwrap();

    let rung_ids: Vec<Option<usize>> = crossings(&cpr, input.edge_between("h1", "h2").unwrap())
        .into_iter()
        .map(|x| cpr.cluster_id(x))
        .collect();
    assert_eq!(rung_ids, vec![Some(a), Some(p)]);
    let g = cpr.graph();
    let y = g.target(chain[0]);
    assert_eq!(cpr.cluster_id(y), Some(p));
    // Entering from either side puts the child dummy first once.
    assert_eq!(cpr.resolve_crossing(g.adj_target(chain[0])).unwrap(), p);
    assert_eq!(cpr.resolve_crossing(g.adj_source(chain[1])).unwrap(), p);
    assert!(cpr.represents_comb_embedding());
}

#[test]
fn crossing_next_to_a_root_dummy_without_parent_is_reported() {
    let input = ladder(None, Some("A"));
    let p = input.clusters.index(input.cluster("P").unwrap());
    let a = input.clusters.index(input.cluster("A").unwrap());
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();

    let chain = cross_ladder(&mut cpr, &input).unwrap();

    let rung_ids: Vec<Option<usize>> = crossings(&cpr, input.edge_between("h1", "h2").unwrap())
        .into_iter()
        .map(|x| cpr.cluster_id(x))
        .collect();
    assert_eq!(rung_ids, vec![Some(0), Some(a)]);
    let g = cpr.graph();
    // From the grandchild side the parent of A is taken.
    assert_eq!(cpr.cluster_id(g.target(chain[0])), Some(p));
    // From the root side there is no parent to fall back on.
    let err = cpr.resolve_crossing(g.adj_source(chain[1])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralInconsistency);
    assert!(matches!(err, Error::MissingParent { cluster } if cluster == input.clusters.root()));
}

#[test]
fn original_in_a_child_of_the_dummy_cluster_fails_and_keeps_the_copy() {
    let input = build(json!({
        "nodes": [
            { "id": "a", "x": -1, "y": 0, "cluster": "P" },
            { "id": "b", "x": 1, "y": 0, "cluster": "P" },
            { "id": "c", "x": 0, "y": 1, "cluster": "A" },
            { "id": "d", "x": 0, "y": -1, "cluster": "P" },
            { "id": "f", "x": -0.4, "y": 0.4, "cluster": "P" },
            { "id": "g", "x": 0.4, "y": 0.4, "cluster": "P" }
        ],
        "edges": [
            { "source": "a", "target": "c" },
            { "source": "c", "target": "b" },
            { "source": "b", "target": "d" },
            { "source": "d", "target": "a" },
            { "source": "a", "target": "b" },
            { "source": "c", "target": "d" },
            { "source": "a", "target": "f" },
            { "source": "b", "target": "g" },
            { "source": "f", "target": "g" }
        ],
        "clusters": [{ "id": "P" }, { "id": "A", "parent": "P" }]
    }));
    let p = input.clusters.index(input.cluster("P").unwrap());
    let (cd, fg) = (
        input.edge_between("c", "d").unwrap(),
        input.edge_between("f", "g").unwrap(),
    );
    let mut cpr = ClusterPlanRep::new(&input.graph, &input.clusters);
    cpr.init_cc(0).unwrap();
    cpr.remove_edge_path_embedded(fg);
    cpr.remove_edge_path_embedded(cd);
    route_cd_across_ab(&mut cpr, &input).unwrap();
    let x = crossings(&cpr, cd)[0];
    assert_eq!(cpr.cluster_id(x), Some(p));
    assert_eq!((cpr.graph().node_count(), cpr.graph().edge_count()), (7, 10));

    // f - g crosses c -> x, where c lies in A and x in its parent P.
    let upper = cpr.plan_rep().chain(cd)[0];
    let path = route(
        cpr.graph(),
        copy_of(&cpr, &input, "f"),
        copy_of(&cpr, &input, "g"),
        &[upper],
    );
    let err = cpr.insert_edge_path_embedded(fg, &path).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StructuralInconsistency);
    assert!(matches!(err, Error::AlgorithmFailure { .. }));
    assert!(cpr.plan_rep().chain(fg).is_empty());
    assert_eq!(cpr.plan_rep().chain(cd).len(), 2);
    assert_eq!((cpr.graph().node_count(), cpr.graph().edge_count()), (7, 10));
    assert_eq!(cpr.cluster_id(x), Some(p));
    assert!(cpr.represents_comb_embedding());
}
