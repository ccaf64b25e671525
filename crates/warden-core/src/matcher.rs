//! Descriptor similarity scoring.
//!
//! Distance is cosine distance (`1 − cos θ`), which lies in `[0, 2]` for
//! arbitrary vectors; lower means more similar. A candidate matches when its
//! distance is strictly below the threshold — a distance exactly equal to
//! the threshold is a non-match.

use crate::identity::Descriptor;

/// The deterministic fail-closed distance: the upper bound of the cosine
/// distance range. Reported whenever no meaningful comparison is possible
/// (missing reference, dimension mismatch, zero-norm input).
pub const WORST_DISTANCE: f32 = 2.0;

/// A match verdict together with the raw distance that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
  pub is_match: bool,
  pub distance: f32,
}

/// Cosine distance between two equal-length vectors.
///
/// Returns [`WORST_DISTANCE`] if the lengths differ or either vector has
/// zero norm (the angle is undefined; treat as maximally dissimilar).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() || a.is_empty() {
    return WORST_DISTANCE;
  }

  let mut dot = 0.0f32;
  let mut norm_a = 0.0f32;
  let mut norm_b = 0.0f32;
  for (x, y) in a.iter().zip(b) {
    dot += x * y;
    norm_a += x * x;
    norm_b += y * y;
  }

  if norm_a == 0.0 || norm_b == 0.0 {
    return WORST_DISTANCE;
  }

  1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Score `candidate` against an optional enrolled `reference`.
///
/// A missing reference fails closed: no match, worst-case distance. The
/// distance is always computed and returned so callers can record it.
pub fn score(
  reference: Option<&Descriptor>,
  candidate: &Descriptor,
  threshold: f32,
) -> Verdict {
  let distance = match reference {
    Some(reference) => {
      cosine_distance(reference.as_slice(), candidate.as_slice())
    }
    None => WORST_DISTANCE,
  };

  Verdict { is_match: distance < threshold, distance }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(values: &[f32]) -> Descriptor { Descriptor(values.to_vec()) }

  #[test]
  fn identical_vectors_have_zero_distance() {
    let distance = cosine_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
    assert!(distance.abs() < 1e-6);
  }

  #[test]
  fn scaling_does_not_change_distance() {
    let distance = cosine_distance(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
    assert!(distance.abs() < 1e-6);
  }

  #[test]
  fn orthogonal_vectors_have_distance_one() {
    let distance = cosine_distance(&[1.0, 0.0], &[0.0, 1.0]);
    assert!((distance - 1.0).abs() < 1e-6);
  }

  #[test]
  fn opposite_vectors_have_worst_distance() {
    let distance = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]);
    assert!((distance - WORST_DISTANCE).abs() < 1e-6);
  }

  #[test]
  fn dimension_mismatch_is_worst_distance() {
    assert_eq!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0, 0.0]), WORST_DISTANCE);
  }

  #[test]
  fn zero_norm_is_worst_distance() {
    assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), WORST_DISTANCE);
    assert_eq!(cosine_distance(&[1.0, 0.0], &[0.0, 0.0]), WORST_DISTANCE);
  }

  #[test]
  fn empty_vectors_are_worst_distance() {
    assert_eq!(cosine_distance(&[], &[]), WORST_DISTANCE);
  }

  #[test]
  fn match_below_threshold() {
    let verdict = score(Some(&d(&[1.0, 0.0])), &d(&[1.0, 0.1]), 0.3);
    assert!(verdict.is_match);
    assert!(verdict.distance < 0.3);
  }

  #[test]
  fn no_match_above_threshold() {
    let verdict = score(Some(&d(&[1.0, 0.0])), &d(&[0.0, 1.0]), 0.3);
    assert!(!verdict.is_match);
    assert!((verdict.distance - 1.0).abs() < 1e-6);
  }

  #[test]
  fn distance_equal_to_threshold_is_no_match() {
    let reference = d(&[1.0, 0.0]);
    let candidate = d(&[0.7, (1.0f32 - 0.49).sqrt()]);
    // Use the computed distance itself as the threshold so the equality
    // case is exercised without floating-point guesswork.
    let threshold = cosine_distance(reference.as_slice(), candidate.as_slice());
    let verdict = score(Some(&reference), &candidate, threshold);
    assert!(!verdict.is_match);
    assert_eq!(verdict.distance, threshold);
  }

  #[test]
  fn missing_reference_fails_closed() {
    let verdict = score(None, &d(&[1.0, 0.0]), 0.3);
    assert!(!verdict.is_match);
    assert_eq!(verdict.distance, WORST_DISTANCE);
  }

  #[test]
  fn verdict_is_monotonic_in_distance() {
    // Candidates sweeping away from the reference: distances must not
    // decrease, and the verdict must flip from match to non-match at most
    // once.
    let reference = d(&[1.0, 0.0]);
    let threshold = 0.3;

    let mut last_distance = -1.0f32;
    let mut seen_non_match = false;
    for step in 0..=10 {
      let theta = std::f32::consts::PI * (step as f32) / 10.0;
      let candidate = d(&[theta.cos(), theta.sin()]);
      let verdict = score(Some(&reference), &candidate, threshold);

      assert!(verdict.distance >= last_distance - 1e-6);
      last_distance = verdict.distance;

      if seen_non_match {
        assert!(!verdict.is_match, "verdict flipped back to match");
      }
      if !verdict.is_match {
        seen_non_match = true;
      }
    }
    assert!(seen_non_match);
  }
}
