use anyhow::Context;
use joinsearch::cost::NestedLoopCostModel;
use joinsearch::expr::{ExprNode, JoinExprRef};
use joinsearch::graph::JoinGraph;
use joinsearch::operand::ScanOperand;
use joinsearch::optimizer::{JoinOrderOptimizer, OptimizerConfig, OptimizerContext};
use joinsearch::stat::CachedRowCounts;
use joinsearch::trace::LogTracer;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    pub rows: u64,
}

#[derive(Deserialize)]
pub struct TestCase {
    pub name: String,
    pub tables: Vec<TableDef>,
    /// Equi join pairs, each side is a table name or alias.
    #[serde(default)]
    pub joins: Vec<(String, String)>,
    /// Raw condition, used instead of `joins` when present.
    #[serde(default)]
    pub condition: Option<ExprNode>,
    #[serde(default)]
    pub config: OptimizerConfig,
    #[serde(default)]
    pub parse_only: bool,
    #[serde(default)]
    pub expected_order: Option<Vec<String>>,
    #[serde(default)]
    pub expected_strategies: Option<Vec<String>>,
    #[serde(default)]
    pub expected_explain: Option<String>,
}

impl TestCase {
    fn condition(&self) -> Option<ExprNode> {
        self.condition.clone().or_else(|| {
            ExprNode::and_all(self.joins.iter().map(|(left, right)| {
                ExprNode::eq(ExprNode::column(left, "id"), ExprNode::column(right, "id"))
            }))
        })
    }

    fn row_counts(&self) -> HashMap<String, u64> {
        self.tables
            .iter()
            .map(|table| (table.name.clone(), table.rows))
            .collect()
    }

    fn operands(&self, condition: Option<&JoinExprRef>) -> Vec<ScanOperand> {
        self.tables
            .iter()
            .enumerate()
            .map(|(idx, table)| {
                let mut operand = ScanOperand::new(table.name.as_str());
                if let Some(alias) = &table.alias {
                    operand = operand.with_alias(alias.as_str());
                }
                match condition {
                    Some(condition) if idx == 0 => operand.with_condition(condition.clone()),
                    _ => operand,
                }
            })
            .collect()
    }
}

pub struct TestCaseRunner {
    /// Input file path.
    pub paths: Vec<PathBuf>,
}

impl TestCaseRunner {
    pub fn run(self) {
        for path in &self.paths {
            let file = File::options()
                .read(true)
                .open(path)
                .with_context(|| format!("Failed to open test case file: {:?}", &path))
                .unwrap();

            let test_cases: Vec<TestCase> = serde_yaml::from_reader(file)
                .with_context(|| format!("Failed to load test cases from file: {:?}", &path))
                .unwrap();

            for test_case in test_cases {
                self.run_case(path, test_case);
            }
        }
    }

    fn run_case<P: AsRef<Path> + Debug>(&self, path: &P, test_case: TestCase) {
        let condition: Option<JoinExprRef> =
            test_case.condition().map(|c| Arc::new(c) as JoinExprRef);
        let mut operands = test_case.operands(condition.as_ref());
        let row_counts = CachedRowCounts::new(test_case.row_counts());
        let cost_model =
            NestedLoopCostModel::new(&row_counts, JoinGraph::build(condition.as_deref()));

        let mut optimizer = JoinOrderOptimizer::with_tracer(
            &mut operands,
            condition.clone(),
            OptimizerContext::new(&cost_model, &row_counts),
            test_case.config.clone(),
            LogTracer,
        );
        let top = optimizer
            .optimize(test_case.parse_only, true)
            .with_context(|| format!("Failed to optimize {} in {:?}", test_case.name, path))
            .unwrap();

        let plan = optimizer.best_plan().unwrap();
        let n = test_case.tables.len();
        assert!(
            plan.is_permutation_of(n),
            "Plan {:?} of {} in {:?} is not a permutation.",
            plan.order(),
            test_case.name,
            path
        );
        assert_eq!(plan.order()[0], top);
        assert_eq!(test_case.parse_only, optimizer.cost().is_none());

        // the committed chain follows the plan
        let mut chain = vec![top];
        while let Some(next) = optimizer.operands()[*chain.last().unwrap()].join() {
            chain.push(next);
        }
        assert_eq!(plan.order(), chain.as_slice());

        if let Some(expected_order) = &test_case.expected_order {
            let order: Vec<&str> = plan
                .order()
                .iter()
                .map(|id| optimizer.operands()[*id].table_name())
                .collect();
            assert_eq!(
                expected_order, &order,
                "Join order of {} in {:?} is different.",
                test_case.name, path
            );
        }

        if let Some(expected_strategies) = &test_case.expected_strategies {
            let strategies: Vec<String> = optimizer
                .stats()
                .strategies
                .iter()
                .map(|s| s.to_string())
                .collect();
            assert_eq!(
                expected_strategies, &strategies,
                "Strategies of {} in {:?} are different.",
                test_case.name, path
            );
        }

        if let Some(expected_explain) = &test_case.expected_explain {
            assert_eq!(
                expected_explain,
                &optimizer.explain().unwrap(),
                "Explain of {} in {:?} is different.",
                test_case.name,
                path
            );
        }
    }
}
