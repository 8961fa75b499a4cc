/// Upper-bound comparison for one grid breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Applies when `count < n`.
    Below(usize),
    /// Applies when `count <= n`.
    AtMost(usize),
}

impl Bound {
    fn admits(self, count: usize) -> bool {
        match self {
            Bound::Below(n) => count < n,
            Bound::AtMost(n) => count <= n,
        }
    }
}

/// Ordered breakpoint table mapping a cluster population to a square grid
/// side. The first matching bound wins; counts past every bound use
/// `fallback_side`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridBreakpoints {
    steps: Vec<(Bound, usize)>,
    fallback_side: usize,
}

impl GridBreakpoints {
    pub fn new(steps: Vec<(Bound, usize)>, fallback_side: usize) -> Self {
        Self {
            steps,
            fallback_side,
        }
    }

    /// Grid side length for `count` thumbnails.
    pub fn side_for(&self, count: usize) -> usize {
        self.steps
            .iter()
            .find(|(bound, _)| bound.admits(count))
            .map(|&(_, side)| side)
            .unwrap_or(self.fallback_side)
    }

    pub fn steps(&self) -> &[(Bound, usize)] {
        &self.steps
    }

    pub fn fallback_side(&self) -> usize {
        self.fallback_side
    }
}

impl Default for GridBreakpoints {
    /// The mix of `<` and `<=` is intentional and kept as-is.
    fn default() -> Self {
        Self::new(
            vec![
                (Bound::Below(10), 3),
                (Bound::AtMost(25), 5),
                (Bound::Below(50), 7),
                (Bound::AtMost(81), 9),
                (Bound::AtMost(121), 11),
                (Bound::AtMost(400), 20),
            ],
            30,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 3)]
    #[case(5, 3)]
    #[case(9, 3)]
    #[case(10, 5)]
    #[case(25, 5)]
    #[case(26, 7)]
    #[case(49, 7)]
    #[case(50, 9)]
    #[case(81, 9)]
    #[case(82, 11)]
    #[case(121, 11)]
    #[case(122, 20)]
    #[case(400, 20)]
    #[case(401, 30)]
    #[case(5000, 30)]
    fn test_default_breakpoints(#[case] count: usize, #[case] side: usize) {
        assert_eq!(GridBreakpoints::default().side_for(count), side);
    }

    #[test]
    fn test_custom_table() {
        let table = GridBreakpoints::new(vec![(Bound::AtMost(4), 2)], 4);
        assert_eq!(table.side_for(4), 2);
        assert_eq!(table.side_for(5), 4);
    }

    #[test]
    fn test_empty_table_uses_fallback() {
        assert_eq!(GridBreakpoints::new(vec![], 6).side_for(1), 6);
    }
}
