use proptest::prelude::{prop, prop_assert_eq, proptest, ProptestConfig, Strategy};

use crate::{Cost, Distance, Domain, Solver, SolverConfig, SolverError};

fn digits(range: std::ops::RangeInclusive<u32>) -> Domain<u32> {
    range.collect()
}

#[track_caller]
fn expect_assignment(solver: &Solver<'_, u32>, actual: &Cost<'_, u32>, expected: &[(&str, u32)]) {
    let solution = solver
        .optimized_solution(&Cost::zero(), actual)
        .expect("expected a solution");
    for (name, value) in expected {
        assert_eq!(solution.get(name), Some(value), "value of {name}");
    }
}

#[test]
fn domain_dedups_in_order() {
    let domain: Domain<u32> = [3, 1, 3, 2, 1].into_iter().collect();
    assert_eq!(domain.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);

    let mut domain = Domain::single(4);
    assert!(!domain.push(4));
    assert!(domain.push(5));
    assert_eq!(domain.len(), 2);
}

#[test]
fn first_registration_wins() {
    let mut solver = Solver::new();
    assert!(solver.add_variable("a", Domain::single(1)));
    assert!(!solver.add_variable("a", digits(1..=3)));
    assert_eq!(solver.num_variables(), 1);

    expect_assignment(&solver, &Cost::zero(), &[("a", 1)]);
}

#[test]
fn unknown_variable_in_constraint() {
    let mut solver: Solver<'_, u32> = Solver::new();
    solver.add_variable("a", digits(0..=1));
    let err = solver.add_constraint(["a", "b"], |_| true).unwrap_err();
    assert_eq!(err, SolverError::UnknownVariable("b".into()));
}

#[test]
fn binary_constraint() {
    let mut solver = Solver::new();
    solver.add_variable("a", digits(1..=3));
    solver.add_variable("b", digits(1..=3));
    solver
        .add_constraint(["a", "b"], |env| env.get("a") > env.get("b"))
        .unwrap();

    expect_assignment(&solver, &Cost::zero(), &[("a", 2), ("b", 1)]);
}

#[test]
fn unsatisfiable_returns_none() {
    let mut solver = Solver::new();
    solver.add_variable("a", digits(1..=3));
    solver.add_variable("b", digits(1..=3));
    solver.add_constraint(["a", "b"], |env| env.get("a") == env.get("b")).unwrap();
    solver.add_constraint(["a"], |env| env.get("a") == Some(&1)).unwrap();
    solver.add_constraint(["b"], |env| env.get("b") == Some(&2)).unwrap();

    assert_eq!(solver.optimized_solution(&Cost::zero(), &Cost::zero()), None);
}

#[test]
fn empty_domain_returns_none() {
    let mut solver: Solver<'_, u32> = Solver::new();
    solver.add_variable("a", Domain::default());
    assert_eq!(solver.optimized_solution(&Cost::zero(), &Cost::zero()), None);
}

#[test]
fn unary_constraint_filters_domain() {
    let mut solver = Solver::new();
    solver.add_variable("a", digits(0..=9));
    solver
        .add_constraint(["a"], |env| env.get("a").is_some_and(|a| a % 4 == 3))
        .unwrap();

    expect_assignment(&solver, &Cost::zero(), &[("a", 3)]);
}

#[test]
fn actual_cost_picks_cheapest() {
    let mut solver = Solver::new();
    solver.add_variable("a", digits(0..=3));
    solver.add_variable("b", digits(0..=3));
    solver.add_constraint(["a", "b"], |env| env.get("a") != env.get("b")).unwrap();

    // large `a` matters twice as much as large `b`
    let actual = Cost::zero()
        .with_term("a", |a: Option<&u32>| a.map_or(10, |a| 2 * (3 - Distance::from(*a))))
        .with_term("b", |b: Option<&u32>| b.map_or(10, |b| 3 - Distance::from(*b)));

    let solution = solver.optimized_solution(&Cost::zero(), &actual).unwrap();
    assert_eq!(solution.get("a"), Some(&3));
    assert_eq!(solution.get("b"), Some(&2));
    assert_eq!(solution.cost(), 1);
}

#[test]
fn heuristic_breaks_ties() {
    let mut solver = Solver::new();
    solver.add_variable("a", digits(0..=3));

    let heuristic = Cost::zero().with_term("a", |a: Option<&u32>| match a {
        Some(2) => 0,
        _ => 1,
    });

    let solution = solver.optimized_solution(&heuristic, &Cost::zero()).unwrap();
    assert_eq!(solution.get("a"), Some(&2));
}

#[test]
fn base_cost_sees_state_counts() {
    let mut solver = Solver::new();
    solver.add_variable("a", digits(0..=1));
    solver.add_variable("b", digits(0..=1));
    solver.add_variable("c", digits(0..=1));
    solver.add_constraint(["a", "b"], |_| true).unwrap();

    let actual = Cost::new(|query| {
        let unsatisfied = query.num_constraints() - query.num_satisfied();
        (query.num_variables() * 100 + query.num_assigned() * 10 + unsatisfied) as Distance
    });

    let solution = solver.optimized_solution(&Cost::zero(), &actual).unwrap();
    assert_eq!(solution.cost(), 330);
    assert_eq!(solution.heuristic_cost(), 0);
}

#[test]
fn independent_variables_are_separate_components() {
    let mut solver = Solver::new();
    for name in ["a", "b", "c", "d"] {
        solver.add_variable(name, digits(0..=2));
    }
    solver.add_constraint(["a", "b"], |env| env.get("a") != env.get("b")).unwrap();

    let solution = solver.optimized_solution(&Cost::zero(), &Cost::zero()).unwrap();
    assert_eq!(solution.stats().components, 3);
    assert_eq!(solution.len(), 4);
    assert!(!solution.stats().truncated);
}

#[test]
fn propagation_solves_chain_without_backtracking() {
    let names = (0..50).map(|i| format!("v{i}")).collect::<Vec<_>>();
    let mut solver = Solver::new();
    for name in &names {
        solver.add_variable(name.as_str(), digits(0..=4));
    }
    for pair in names.windows(2) {
        let (lhs, rhs) = (pair[0].clone(), pair[1].clone());
        solver
            .add_constraint([&pair[0], &pair[1]], move |env| env.get(&lhs) == env.get(&rhs))
            .unwrap();
    }
    solver
        .add_constraint(["v0"], |env| env.get("v0") == Some(&4))
        .unwrap();

    let solution = solver.optimized_solution(&Cost::zero(), &Cost::zero()).unwrap();
    assert!(solution.iter().all(|(_, value)| *value == 4));
    assert_eq!(solution.stats().backtracks, 0);
}

#[test]
fn node_limit_keeps_best_so_far() {
    let build = |config: SolverConfig| {
        let mut solver = Solver::with_config(config);
        for name in ["a", "b", "c"] {
            solver.add_variable(name, digits(0..=2));
        }
        solver.add_constraint(["a", "b", "c"], |_| true).unwrap();
        solver
    };
    let prefer_high = || {
        ["a", "b", "c"].into_iter().fold(Cost::zero(), |cost, name| {
            cost.with_term(name, |v: Option<&u32>| v.map_or(2, |v| 2 - Distance::from(*v)))
        })
    };

    let unlimited = build(SolverConfig::default());
    let actual = prefer_high();
    let solution = unlimited.optimized_solution(&Cost::zero(), &actual).unwrap();
    assert_eq!(solution.cost(), 0);
    assert!(!solution.stats().truncated);

    // three nodes reach the first complete assignment, all zeros
    let limited = build(SolverConfig::default().with_node_limit(3));
    let actual = prefer_high();
    let solution = limited.optimized_solution(&Cost::zero(), &actual).unwrap();
    assert!(solution.stats().truncated);
    assert_eq!(solution.get("a"), Some(&0));
    assert_eq!(solution.cost(), 6);

    let starved = build(SolverConfig::default().with_node_limit(2));
    let actual = prefer_high();
    assert_eq!(starved.optimized_solution(&Cost::zero(), &actual), None);
}

// ==============================================================================
// Branch and bound agrees with exhaustive enumeration
// ==============================================================================

#[derive(Debug, Clone)]
struct SmallProblem {
    num_vars: usize,
    edges: Vec<(usize, usize, bool)>,
    weights: Vec<[Distance; 3]>,
}

fn arb_problem() -> impl Strategy<Value = SmallProblem> {
    (1usize..5).prop_flat_map(|num_vars| {
        let edge = (0..num_vars, 0..num_vars, prop::bool::ANY);
        (
            prop::collection::vec(edge, 0..6),
            prop::collection::vec(prop::array::uniform3(0u64..5), num_vars),
        )
            .prop_map(move |(edges, weights)| SmallProblem {
                num_vars,
                edges,
                weights,
            })
    })
}

fn name(i: usize) -> String {
    format!("x{i}")
}

fn holds(edge: &(usize, usize, bool), values: &[u32]) -> bool {
    let (lhs, rhs, equal) = *edge;
    (values[lhs] == values[rhs]) == equal
}

fn brute_force(problem: &SmallProblem) -> Option<Distance> {
    let total = 3usize.pow(problem.num_vars as u32);
    (0..total)
        .filter_map(|mut code| {
            let values = (0..problem.num_vars)
                .map(|_| {
                    let digit = (code % 3) as u32;
                    code /= 3;
                    digit
                })
                .collect::<Vec<_>>();
            problem
                .edges
                .iter()
                .all(|edge| holds(edge, &values))
                .then(|| {
                    values
                        .iter()
                        .zip(&problem.weights)
                        .map(|(v, w)| w[*v as usize])
                        .sum()
                })
        })
        .min()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn matches_brute_force(problem in arb_problem()) {
        let mut solver = Solver::new();
        for i in 0..problem.num_vars {
            solver.add_variable(name(i), digits(0..=2));
        }
        for edge in &problem.edges {
            let edge = *edge;
            let (lhs, rhs) = (name(edge.0), name(edge.1));
            solver
                .add_constraint([lhs.clone(), rhs.clone()], move |env| {
                    match (env.get(&lhs), env.get(&rhs)) {
                        (Some(l), Some(r)) => (l == r) == edge.2,
                        _ => true,
                    }
                })
                .unwrap();
        }

        let mut actual = Cost::zero();
        for (i, weights) in problem.weights.iter().enumerate() {
            let weights = *weights;
            actual.add_term(name(i), move |v: Option<&u32>| v.map_or(0, |v| weights[*v as usize]));
        }

        let solution = solver.optimized_solution(&Cost::zero(), &actual);
        prop_assert_eq!(solution.map(|s| s.cost()), brute_force(&problem));
    }
}
