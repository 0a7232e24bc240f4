//! Integration tests for the directed graph

use beanstalk_foundation::Directed;

#[test]
fn diamond() {
    let mut graph = Directed::new();
    graph.add_root(0);
    assert!(graph.add_edge(0, 1));
    assert!(graph.add_edge(0, 2));
    assert!(graph.add_edge(1, 3));
    assert!(graph.add_edge(2, 3));
    assert!(!graph.add_edge(2, 3));

    assert_eq!(graph.successors(0).elems(), [1, 2]);
    assert_eq!(graph.predecessors(3).elems(), [1, 2]);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.nodes().len(), 4);
    assert_eq!(graph.roots().elems(), [0]);
}

#[test]
fn unknown_nodes_have_no_neighbors() {
    let graph = Directed::new();
    assert!(!graph.contains(9));
    assert!(graph.successors(9).is_empty());
    assert!(graph.predecessors(9).is_empty());
    assert!(!graph.has_edge(9, 10));
}

#[test]
fn isolated_nodes_count() {
    let mut graph = Directed::new();
    assert!(graph.add_node(4));
    assert!(!graph.add_node(4));
    assert!(graph.contains(4));
    assert_eq!(graph.edge_count(), 0);
}
