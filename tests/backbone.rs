use sat_backbone::backbone::{compute_backbone, simplify, Backbone, Extractor, Outcome};
use sat_backbone::error::{Error, OracleError};
use sat_backbone::oracle::{Budget, Budgeted, IncrementalOracle, Oracle, Verdict};
use sat_backbone::sat::clause::Clause;
use sat_backbone::sat::cnf::Cnf;
use sat_backbone::sat::dimacs::{parse_str, to_dimacs_string};
use sat_backbone::sat::literal::Literal;

fn lit(v: i32) -> Literal {
    Literal::from_i32(v).unwrap()
}

fn sorted(backbone: &Backbone) -> Vec<i32> {
    let mut literals: Vec<i32> = backbone.iter().map(|l| l.to_i32()).collect();
    literals.sort_unstable();
    literals
}

fn backbone_of(cnf: &Cnf) -> Option<Backbone> {
    match compute_backbone(cnf, IncrementalOracle::new()).unwrap() {
        Outcome::Backbone(backbone) => Some(backbone),
        Outcome::Unsatisfiable => None,
    }
}

fn satisfies(clause: &Clause, assignment: u32) -> bool {
    clause
        .iter()
        .any(|l| (assignment >> (l.variable() - 1) & 1 == 1) == l.polarity())
}

/// Every model of `cnf`, as bit masks over its declared variables.
fn brute_force_models(cnf: &Cnf) -> Vec<u32> {
    assert!(cnf.num_vars <= 20);
    (0..1u32 << cnf.num_vars)
        .filter(|&assignment| cnf.iter().all(|c| satisfies(c, assignment)))
        .collect()
}

fn brute_force_backbone(cnf: &Cnf) -> Option<Vec<i32>> {
    let models = brute_force_models(cnf);
    if models.is_empty() {
        return None;
    }
    let mut literals = Vec::new();
    for var in 1..=cnf.num_vars {
        let bit = 1u32 << (var - 1);
        let var = var as i32;
        if models.iter().all(|m| m & bit != 0) {
            literals.push(var);
        } else if models.iter().all(|m| m & bit == 0) {
            literals.push(-var);
        }
    }
    literals.sort_unstable();
    Some(literals)
}

fn random_formula(rng: &mut fastrand::Rng) -> Cnf {
    let num_vars = rng.usize(3..=14);
    let num_clauses = rng.usize(num_vars..=num_vars * 5);
    let clauses = (0..num_clauses)
        .map(|_| {
            let width = if rng.u8(..) < 32 { 1 } else { rng.usize(2..=3) };
            Clause::new((0..width).map(|_| Literal::new(rng.u32(1..=num_vars as u32), rng.bool())))
        })
        .collect();
    Cnf::new(num_vars, clauses)
}

#[test]
fn test_forced_literal_and_implication() {
    let cnf = Cnf::from(vec![vec![1, 2], vec![-1, 3], vec![1]]);
    let backbone = backbone_of(&cnf).unwrap();
    assert_eq!(sorted(&backbone), vec![1, 3]);

    let simplified = simplify(&cnf, &backbone).unwrap();
    assert_eq!(simplified.len(), 2);
    assert!(simplified.iter().all(Clause::is_unit));
    let mut units: Vec<i32> = simplified.iter().map(|c| c[0].to_i32()).collect();
    units.sort_unstable();
    assert_eq!(units, vec![1, 3]);
}

#[test]
fn test_contradiction_is_unsatisfiable() {
    let cnf = Cnf::from(vec![vec![1], vec![-1]]);
    assert_eq!(
        compute_backbone(&cnf, IncrementalOracle::new()).unwrap(),
        Outcome::Unsatisfiable
    );
}

#[test]
fn test_negative_unit_forces_both_neighbours() {
    // -2 leaves 1 and 3 as the only way to satisfy the binary clauses.
    let cnf = Cnf::from(vec![vec![1, 2], vec![2, 3], vec![-2]]);
    let backbone = backbone_of(&cnf).unwrap();
    assert_eq!(sorted(&backbone), vec![-2, 1, 3]);

    let simplified = simplify(&cnf, &backbone).unwrap();
    assert_eq!(simplified.len(), 3);
    assert!(simplified.iter().all(Clause::is_unit));
}

#[test]
fn test_free_variables_are_not_in_backbone() {
    let cnf = Cnf::from(vec![vec![1, 2], vec![-2, 3], vec![4]]);
    let backbone = backbone_of(&cnf).unwrap();
    assert_eq!(sorted(&backbone), vec![4]);

    let simplified = simplify(&cnf, &backbone).unwrap();
    assert_eq!(simplified.num_vars, 4);
    assert_eq!(
        to_dimacs_string(&simplified, None),
        "p cnf 4 3\n4 0\n1 2 0\n-2 3 0\n"
    );
}

#[test]
fn test_matches_brute_force() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let mut satisfiable = 0;

    for _ in 0..300 {
        let cnf = random_formula(&mut rng);
        let expected = brute_force_backbone(&cnf);
        let actual = backbone_of(&cnf);
        match (&expected, &actual) {
            (None, None) => {}
            (Some(expected), Some(actual)) => {
                satisfiable += 1;
                assert_eq!(&sorted(actual), expected, "formula:\n{cnf}");
            }
            _ => panic!("satisfiability mismatch on formula:\n{cnf}"),
        }
    }
    assert!(satisfiable > 50, "too few satisfiable formulas: {satisfiable}");
}

#[test]
fn test_every_backbone_literal_is_forced() {
    let mut rng = fastrand::Rng::with_seed(17);
    for _ in 0..100 {
        let cnf = random_formula(&mut rng);
        let Some(backbone) = backbone_of(&cnf) else {
            continue;
        };
        for &l in backbone.iter() {
            assert!(!backbone.contains(!l));
            let mut oracle = IncrementalOracle::new();
            oracle.load(&cnf).unwrap();
            assert_eq!(oracle.check(&[!l]).unwrap(), Verdict::Unsatisfiable);
        }
    }
}

#[test]
fn test_simplified_formula_is_equivalent() {
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..150 {
        let cnf = random_formula(&mut rng);
        let Some(backbone) = backbone_of(&cnf) else {
            continue;
        };
        let simplified = simplify(&cnf, &backbone).unwrap();
        assert_eq!(simplified.num_vars, cnf.num_vars);
        assert!(simplified.len() <= cnf.len() + backbone.len());
        assert_eq!(
            brute_force_models(&simplified),
            brute_force_models(&cnf),
            "formula:\n{cnf}\nsimplified:\n{simplified}"
        );
    }
}

#[test]
fn test_simplification_is_idempotent() {
    let mut rng = fastrand::Rng::with_seed(2024);
    for _ in 0..100 {
        let cnf = random_formula(&mut rng);
        let Some(backbone) = backbone_of(&cnf) else {
            continue;
        };
        let simplified = simplify(&cnf, &backbone).unwrap();
        let again = backbone_of(&simplified).unwrap();
        assert_eq!(sorted(&again), sorted(&backbone));
        assert_eq!(simplify(&simplified, &again).unwrap().len(), simplified.len());
    }
}

#[test]
fn test_partial_backbone_grows_monotonically() {
    let cnf = Cnf::from(vec![
        vec![1],
        vec![-1, 2],
        vec![-2, 3],
        vec![-3, 4],
        vec![5, 6],
        vec![-6, 7],
    ]);
    let full = backbone_of(&cnf).unwrap();

    let mut extractor = Extractor::new(&cnf, IncrementalOracle::new()).unwrap();
    let mut seen: Vec<Literal> = Vec::new();
    while extractor.step().unwrap() {
        let current = extractor.backbone().literals();
        assert!(current.starts_with(&seen));
        assert!(current.iter().all(|&l| full.contains(l)));
        seen = current.to_vec();
    }
    assert_eq!(sorted(extractor.backbone()), vec![1, 2, 3, 4]);
}

#[test]
fn test_budget_expiry_keeps_sound_partial_result() {
    let cnf = Cnf::from(vec![vec![1], vec![-1, 2], vec![-2, 3], vec![-3, 4], vec![-4, 5]]);
    let budget = Budget {
        max_queries: Some(3),
        ..Budget::default()
    };
    let mut extractor = Extractor::new(&cnf, Budgeted::new(IncrementalOracle::new(), budget)).unwrap();

    let err = extractor.run().unwrap_err();
    assert!(matches!(
        err,
        Error::OracleFailure(OracleError::BudgetExhausted(3))
    ));
    let partial = extractor.backbone();
    assert_eq!(partial.len(), 2);
    assert!(partial.iter().all(|l| l.polarity()));
    assert_eq!(extractor.oracle().queries(), 3);
}

#[test]
fn test_parsed_names_survive_simplification() {
    let input = "c 1 USB\nc 2 NET\np cnf 3 3\n1 0\n-1 2 0\n2 3 0\n";
    let dimacs = parse_str(input).unwrap();
    let backbone = backbone_of(&dimacs.cnf).unwrap();
    assert_eq!(sorted(&backbone), vec![1, 2]);

    let simplified = simplify(&dimacs.cnf, &backbone).unwrap();
    let written = to_dimacs_string(&simplified, Some(&dimacs.names));
    assert!(written.starts_with("c 1 USB\nc 2 NET\np cnf 3 2\n"));
    assert_eq!(parse_str(&written).unwrap().names, dimacs.names);
    assert!(backbone.contains(lit(1)));
}
