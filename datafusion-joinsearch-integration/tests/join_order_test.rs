use datafusion_expr::{col, lit};
use datafusion_joinsearch_integration::conversion::{scan_operands, TableRef};
use joinsearch::cost::NestedLoopCostModel;
use joinsearch::graph::JoinGraph;
use joinsearch::optimizer::{JoinOrderOptimizer, OptimizerConfig, OptimizerContext};
use maplit::hashmap;

#[test]
fn test_order_datafusion_join_condition() {
    let tables = vec![
        TableRef::aliased("customer", "c"),
        TableRef::aliased("orders", "o"),
        TableRef::new("nation"),
    ];
    let condition = col("c.c_custkey")
        .eq(col("o.o_custkey"))
        .and(col("c.c_nationkey").eq(col("nation.n_nationkey")))
        .and(col("o.o_totalprice").gt(lit(1000)));
    let row_counts = hashmap! {
        "customer".to_string() => 150_000u64,
        "orders".to_string() => 1_500_000u64,
        "nation".to_string() => 25u64,
    };

    let (mut operands, condition) = scan_operands(&tables, Some(&condition)).unwrap();
    let graph = JoinGraph::from_operands(&operands);
    assert_eq!(2, graph.edge_count());
    assert!(graph.is_joinable("c", "o"));
    assert!(!graph.is_joinable("o", "nation"));

    let cost_model = NestedLoopCostModel::new(&row_counts, graph);
    let mut optimizer = JoinOrderOptimizer::new(
        &mut operands,
        condition,
        OptimizerContext::new(&cost_model, &row_counts),
        OptimizerConfig::default(),
    );
    let top = optimizer.optimize(false, true).unwrap();

    let expected_result = "\
nation [full scan]
└─ customer c [index customer_join]
   └─ orders o [index orders_join]
";
    assert_eq!(2, top);
    assert_eq!(expected_result, optimizer.explain().unwrap());
}
