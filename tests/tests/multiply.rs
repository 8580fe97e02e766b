use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use series_multiplier::{multiply, multiply_with_config, tracing_sink, MultiplierConfig, MultiplyError, Series, SymbolSet, Term};
use series_multiplier_tests::{Flavor, FloatCoeff, IntCoeff, PolyKey, TrigKey};

fn poly_symbols() -> SymbolSet {
    SymbolSet::new(["x", "y"])
}

fn poly_series(symbols: &SymbolSet, terms: impl IntoIterator<Item = (i64, Vec<i32>)>) -> Series<PolyKey> {
    let mut series = Series::new(symbols.clone());
    for (coeff, exponents) in terms {
        series.insert(Term::new(IntCoeff(coeff), PolyKey::new(exponents)));
    }
    series
}

fn poly_terms(series: &Series<PolyKey>) -> std::collections::HashMap<Vec<i32>, i64> {
    series.iter().map(|t| (t.key.0.clone(), t.cf.0)).collect()
}

/// `(2x + 3y) * (x - y) = 2x^2 + xy - 3y^2`.
#[test]
fn scenario_polynomial_binomial_product() {
    let symbols = poly_symbols();
    let a = poly_series(&symbols, [(2, vec![1, 0]), (3, vec![0, 1])]);
    let b = poly_series(&symbols, [(1, vec![1, 0]), (-1, vec![0, 1])]);

    let result = multiply(&a, &b).unwrap();
    let terms = poly_terms(&result);

    assert_eq!(terms.len(), 3);
    assert_eq!(terms[&vec![2, 0]], 2);
    assert_eq!(terms[&vec![1, 1]], 1);
    assert_eq!(terms[&vec![0, 2]], -3);
}

/// `(x + y)^2 = x^2 + 2xy + y^2`: the `xy` term must coalesce to coefficient 2.
#[test]
fn scenario_duplicate_keys_coalesce() {
    let symbols = poly_symbols();
    let a = poly_series(&symbols, [(1, vec![1, 0]), (1, vec![0, 1])]);

    let result = multiply(&a, &a).unwrap();
    let terms = poly_terms(&result);

    assert_eq!(terms.len(), 3);
    assert_eq!(terms[&vec![2, 0]], 1);
    assert_eq!(terms[&vec![1, 1]], 2);
    assert_eq!(terms[&vec![0, 2]], 1);
}

/// `0 * (x + y) = 0`.
#[test]
fn scenario_zero_series_annihilates() {
    let symbols = poly_symbols();
    let zero: Series<PolyKey> = Series::new(symbols.clone());
    let a = poly_series(&symbols, [(1, vec![1, 0]), (1, vec![0, 1])]);

    let result = multiply(&zero, &a).unwrap();
    assert!(result.is_empty());
}

/// `a * 1 = a` where `1` is the unit series (the zero-exponent monomial).
#[test]
fn scenario_unit_series_is_identity() {
    let symbols = poly_symbols();
    let unit = poly_series(&symbols, [(1, vec![0, 0])]);
    let a = poly_series(&symbols, [(2, vec![1, 0]), (3, vec![0, 1])]);

    let result = multiply(&a, &unit).unwrap();
    assert_eq!(poly_terms(&result), poly_terms(&a));
}

#[test]
fn distributivity_over_addition() {
    let symbols = poly_symbols();
    let a = poly_series(&symbols, [(1, vec![1, 0])]);
    let b = poly_series(&symbols, [(1, vec![0, 1])]);
    let c = poly_series(&symbols, [(5, vec![2, 0]), (7, vec![1, 1])]);

    let mut a_plus_b = poly_series(&symbols, []);
    a_plus_b.insert(Term::new(IntCoeff(1), PolyKey::new(vec![1, 0])));
    a_plus_b.insert(Term::new(IntCoeff(1), PolyKey::new(vec![0, 1])));

    let lhs = poly_terms(&multiply(&a_plus_b, &c).unwrap());

    let mut rhs: std::collections::HashMap<Vec<i32>, i64> = std::collections::HashMap::new();
    for (key, value) in poly_terms(&multiply(&a, &c).unwrap()) {
        *rhs.entry(key).or_insert(0) += value;
    }
    for (key, value) in poly_terms(&multiply(&b, &c).unwrap()) {
        *rhs.entry(key).or_insert(0) += value;
    }

    assert_eq!(lhs, rhs);
}

#[test]
fn commutativity_as_multisets() {
    let symbols = poly_symbols();
    let a = poly_series(&symbols, [(2, vec![1, 0]), (5, vec![0, 1])]);
    let b = poly_series(&symbols, [(3, vec![2, 1]), (1, vec![0, 0])]);

    assert_eq!(poly_terms(&multiply(&a, &b).unwrap()), poly_terms(&multiply(&b, &a).unwrap()));
}

#[test]
fn incompatible_symbol_sets_return_error_and_leave_operands_untouched() {
    let a = poly_series(&poly_symbols(), [(1, vec![1, 0])]);
    let b = poly_series(&SymbolSet::new(["x", "y", "z"]), [(1, vec![1, 0, 0])]);

    let before = poly_terms(&a);
    let err = multiply(&a, &b).unwrap_err();
    assert_eq!(err, MultiplyError::IncompatibleSymbolSets);
    assert_eq!(poly_terms(&a), before);
}

fn trig_symbols() -> SymbolSet {
    SymbolSet::new(["x", "y"])
}

fn trig_series(symbols: &SymbolSet, terms: impl IntoIterator<Item = (f64, Vec<i32>, Flavor)>) -> Series<TrigKey> {
    let mut series = Series::new(symbols.clone());
    for (coeff, multipliers, flavor) in terms {
        let (key, coeff) = TrigKey::canonical(multipliers, flavor, coeff);
        series.insert(Term::new(FloatCoeff(coeff), key));
    }
    series
}

fn trig_terms(series: &Series<TrigKey>) -> std::collections::HashMap<(Vec<i32>, Flavor), f64> {
    series.iter().map(|t| ((t.key.multipliers.clone(), t.key.flavor), t.cf.0)).collect()
}

/// `cos(x) * cos(y) = 1/2 cos(x - y) + 1/2 cos(x + y)`.
#[test]
fn scenario_trigonometric_cos_times_cos() {
    let symbols = trig_symbols();
    let cos_x = trig_series(&symbols, [(1.0, vec![1, 0], Flavor::Cos)]);
    let cos_y = trig_series(&symbols, [(1.0, vec![0, 1], Flavor::Cos)]);

    let result = multiply(&cos_x, &cos_y).unwrap();
    let terms = trig_terms(&result);

    assert_eq!(terms.len(), 2);
    assert_eq!(terms[&(vec![1, -1], Flavor::Cos)], 0.5);
    assert_eq!(terms[&(vec![1, 1], Flavor::Cos)], 0.5);
}

/// `sin(x) * cos(-y)` must canonicalize identically to `sin(x) * cos(y)`.
#[test]
fn scenario_trigonometric_sign_canonicalization() {
    let symbols = trig_symbols();
    let sin_x = trig_series(&symbols, [(1.0, vec![1, 0], Flavor::Sin)]);
    let cos_y = trig_series(&symbols, [(1.0, vec![0, 1], Flavor::Cos)]);
    let cos_neg_y = trig_series(&symbols, [(1.0, vec![0, -1], Flavor::Cos)]);

    let via_cos_y = trig_terms(&multiply(&sin_x, &cos_y).unwrap());
    let via_cos_neg_y = trig_terms(&multiply(&sin_x, &cos_neg_y).unwrap());

    assert_eq!(via_cos_y, via_cos_neg_y);
}

/// Large sparse stress test: parallel (`T = 8`) result must exactly match the
/// single-threaded result, and estimator accuracy stays sane on average.
#[test]
fn scenario_large_sparse_stress_matches_single_threaded() {
    let symbols = SymbolSet::new(["a", "b", "c", "d", "e"]);
    let mut rng = StdRng::seed_from_u64(42);

    let random_series = |rng: &mut StdRng| {
        let mut series = Series::new(symbols.clone());
        for _ in 0..2000 {
            let exponents: Vec<i32> = (0..5).map(|_| rng.gen_range(0, 6)).collect();
            series.insert(Term::new(IntCoeff(rng.gen_range(-5, 6)), PolyKey::new(exponents)));
        }
        series
    };
    let a = random_series(&mut rng);
    let b = random_series(&mut rng);

    let striped_config = MultiplierConfig {
        max_threads: 8,
        min_work_per_thread: 1,
        ..MultiplierConfig::default()
    };
    let single_config = MultiplierConfig {
        max_threads: 1,
        ..MultiplierConfig::default()
    };

    let striped = multiply_with_config(&a, &b, &striped_config).unwrap();
    let single = multiply_with_config(&a, &b, &single_config).unwrap();

    assert_eq!(poly_terms(&striped), poly_terms(&single));

    let sink = tracing_sink();
    if sink.number_of_estimates() > 0 {
        let average_ratio = sink.accumulated_estimate_ratio() / sink.number_of_estimates() as f64;
        assert!(average_ratio.is_finite());
        assert!(average_ratio >= 0.0);
    }
}
