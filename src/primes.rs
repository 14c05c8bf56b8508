//! Prime factorisation by trial division.
//!
//! Divides out 2, then odd candidates `d` while `d * d <= n`. Whatever remains
//! above 1 is itself prime. O(√n) divisions in the worst case (n prime).

/// Prime factors of `n` in non-decreasing order, with multiplicity.
///
/// `0` and `1` have no prime factors.
pub fn prime_factors(mut n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }
    while n % 2 == 0 {
        factors.push(2);
        n /= 2;
    }
    let mut d = 3u64;
    // `d <= n / d` avoids overflowing `d * d` near u64::MAX.
    while d <= n / d {
        while n % d == 0 {
            factors.push(d);
            n /= d;
        }
        d += 2;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// `true` if `n` is prime.
pub fn is_prime(n: u64) -> bool {
    prime_factors(n).len() == 1
}
