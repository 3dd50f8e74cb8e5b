//! Statistical sanity of the derived distributions.

use league_core::rng::{CumulativeWeights, SimRng};

const DRAWS: usize = 100_000;

#[test]
fn poisson_mean_converges_to_lambda() {
    let mut rng = SimRng::new(2024);
    let lambda = 1.5;
    let total: u64 = (0..DRAWS).map(|_| u64::from(rng.poisson(lambda))).sum();
    let mean = total as f64 / DRAWS as f64;
    assert!(
        (mean - lambda).abs() / lambda < 0.05,
        "Poisson mean {mean:.4} is more than 5% away from {lambda}"
    );
}

#[test]
fn poisson_of_zero_rate_is_zero() {
    let mut rng = SimRng::new(1);
    assert!((0..1000).all(|_| rng.poisson(0.0) == 0));
}

#[test]
fn normal_has_requested_moments() {
    let mut rng = SimRng::new(77);
    let samples: Vec<f64> = (0..DRAWS).map(|_| rng.normal(10.0, 2.0)).collect();
    let mean = samples.iter().sum::<f64>() / DRAWS as f64;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / DRAWS as f64;
    assert!((mean - 10.0).abs() < 0.05, "mean {mean:.4}");
    assert!((var.sqrt() - 2.0).abs() < 0.05, "sigma {:.4}", var.sqrt());
    assert!(samples.iter().all(|x| x.is_finite()), "Box–Muller must never produce inf or NaN");
}

#[test]
fn uniform_stays_in_the_open_interval() {
    let mut rng = SimRng::new(5);
    for _ in 0..DRAWS {
        let u = rng.next_f64();
        assert!(u > 0.0 && u < 1.0, "{u} escaped (0, 1)");
    }
}

#[test]
fn weighted_picks_follow_weights() {
    let mut rng = SimRng::new(9);
    let weights = CumulativeWeights::new([3.0, 1.8, 0.7, 0.1]);
    let mut counts = [0usize; 4];
    for _ in 0..DRAWS {
        counts[weights.pick(&mut rng).expect("non-empty")] += 1;
    }
    let total = weights.total();
    for (i, w) in [3.0, 1.8, 0.7, 0.1].iter().enumerate() {
        let observed = counts[i] as f64 / DRAWS as f64;
        let expected = w / total;
        assert!((observed - expected).abs() < 0.01, "slot {i}: {observed:.4} vs {expected:.4}");
    }
}

#[test]
fn shuffle_keeps_every_element() {
    let mut rng = SimRng::new(13);
    let mut items: Vec<u32> = (0..32).collect();
    rng.shuffle(&mut items);
    let mut sorted = items.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..32).collect::<Vec<_>>());
}
