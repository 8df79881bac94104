use rand::Rng;

/// Shuffles `elements` in place with the Fisher–Yates algorithm.
///
/// Walking from the last position down to the second, each position is
/// swapped with a uniformly chosen position at or before it. The result
/// depends only on the input order and the generator's state, so a seeded
/// generator yields a reproducible permutation.
///
/// # Examples
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use sequins::ordering::fisher_yates;
///
/// let mut first = vec![1, 2, 3, 4, 5];
/// let mut second = first.clone();
/// fisher_yates(&mut first, &mut ChaCha8Rng::seed_from_u64(7));
/// fisher_yates(&mut second, &mut ChaCha8Rng::seed_from_u64(7));
/// assert_eq!(first, second);
///
/// first.sort_unstable();
/// assert_eq!(first, vec![1, 2, 3, 4, 5]);
/// ```
pub fn fisher_yates<T, R>(elements: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for index in (1..elements.len()).rev() {
        let other = rng.gen_range(0..=index);
        elements.swap(index, other);
    }
}
