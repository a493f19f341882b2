/// Levenshtein edit distance using the two-row O(min(m,n)) space algorithm.
fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    let (m, n) = (a.len(), b.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Keep the shorter string in the inner loop to minimise allocation.
    let (a, b, m, n) = if m <= n { (a, b, m, n) } else { (b, a, n, m) };

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Best-window similarity on a 0–100 scale: the shorter string slides over
/// the longer one and the closest window wins. 100 means the shorter string
/// appears verbatim inside the longer.
pub(crate) fn partial_similarity(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return 0.0;
    }

    let mut best = 0u32;
    for start in 0..=(long.len() - short.len()) {
        let window = &long[start..start + short.len()];
        // Equal-length strings, so the distance never exceeds the length.
        let distance = levenshtein_chars(&short, window);
        let matched = (short.len() - distance) as u32;
        if matched > best {
            best = matched;
        }
        if best as usize == short.len() {
            break;
        }
    }

    best as f64 / short.len() as f64 * 100.0
}
