//! Binary city-to-position assignment matrices.

/// An `n x n` matrix of cells where cell `(city, position)` is 1 iff the city
/// occupies that tour position.
///
/// Any cell values are representable; only matrices with 0/1 cells and
/// exactly one 1 per row and per column encode a tour. Stored row-major,
/// so the linear index of `(city, position)` is `city * n + position`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryAssignment {
    n: usize,
    cells: Vec<u8>,
}

impl BinaryAssignment {
    /// All-zero `n x n` matrix.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            cells: vec![0; n * n],
        }
    }

    /// One-hot encoding of `tour`: `tour[position]` is the city at `position`.
    ///
    /// Panics if a city index is `>= tour.len()`.
    pub fn from_tour(tour: &[usize]) -> Self {
        let mut matrix = Self::zeros(tour.len());
        for (position, &city) in tour.iter().enumerate() {
            matrix.set(city, position, 1);
        }
        matrix
    }

    /// Builds a matrix from row-major cells. Returns `None` unless
    /// `cells.len() == n * n`.
    pub fn from_cells(n: usize, cells: Vec<u8>) -> Option<Self> {
        (cells.len() == n * n).then_some(Self { n, cells })
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, city: usize, position: usize) -> u8 {
        self.cells[city * self.n + position]
    }

    #[inline]
    pub fn set(&mut self, city: usize, position: usize, value: u8) {
        self.cells[city * self.n + position] = value;
    }

    /// Toggles a cell between 0 and 1 (any non-zero value becomes 0).
    pub fn flip(&mut self, city: usize, position: usize) {
        let cell = &mut self.cells[city * self.n + position];
        *cell = u8::from(*cell == 0);
    }

    pub fn row_sum(&self, city: usize) -> usize {
        self.row(city).iter().map(|&v| usize::from(v)).sum()
    }

    pub fn column_sum(&self, position: usize) -> usize {
        (0..self.n)
            .map(|city| usize::from(self.get(city, position)))
            .sum()
    }

    /// Sum of all cells.
    pub fn count_ones(&self) -> usize {
        self.cells.iter().map(|&v| usize::from(v)).sum()
    }

    fn row(&self, city: usize) -> &[u8] {
        &self.cells[city * self.n..(city + 1) * self.n]
    }

    /// Exchanges two rows (the assignments of two cities).
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let n = self.n;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.cells.split_at_mut(hi * n);
        head[lo * n..(lo + 1) * n].swap_with_slice(&mut tail[..n]);
    }

    /// Exchanges two columns (the occupants of two positions).
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        let n = self.n;
        for city in 0..n {
            self.cells.swap(city * n + a, city * n + b);
        }
    }

    /// Rotates columns `start..end` right by one in every row: column
    /// `end - 1` moves to `start` and the others shift one place right.
    pub fn rotate_columns_right(&mut self, start: usize, end: usize) {
        let n = self.n;
        for city in 0..n {
            self.cells[city * n + start..city * n + end].rotate_right(1);
        }
    }

    /// Whether every cell is 0 or 1 and every row and column sums to 1.
    pub fn is_one_hot(&self) -> bool {
        self.cells.iter().all(|&v| v <= 1)
            && (0..self.n).all(|i| self.row_sum(i) == 1 && self.column_sum(i) == 1)
    }

    /// Decodes the tour: the city at each position.
    ///
    /// Returns `None` if any cell is neither 0 nor 1, some position does not
    /// hold exactly one city, or a city appears at more than one position.
    pub fn to_tour(&self) -> Option<Vec<usize>> {
        if self.cells.iter().any(|&v| v > 1) {
            return None;
        }
        let mut tour = Vec::with_capacity(self.n);
        let mut placed = vec![false; self.n];
        for position in 0..self.n {
            let mut occupants = (0..self.n).filter(|&city| self.get(city, position) == 1);
            let city = occupants.next()?;
            if occupants.next().is_some() || placed[city] {
                return None;
            }
            placed[city] = true;
            tour.push(city);
        }
        Some(tour)
    }

    /// Non-zero cells as `(linear index, value)` pairs.
    pub fn active(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(|(index, &v)| (index, f64::from(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tour_layout() {
        let m = BinaryAssignment::from_tour(&[2, 0, 1]);
        assert_eq!(m.cells(), &[0, 1, 0, 0, 0, 1, 1, 0, 0]);
        assert!(m.is_one_hot());
        assert_eq!(m.count_ones(), 3);
    }

    #[test]
    fn test_round_trip() {
        let tour = vec![3, 1, 0, 2];
        let m = BinaryAssignment::from_tour(&tour);
        assert_eq!(m.to_tour(), Some(tour));
        assert_eq!(BinaryAssignment::from_tour(&m.to_tour().unwrap()), m);
    }

    #[test]
    fn test_decode_failures() {
        let mut m = BinaryAssignment::from_tour(&[0, 1, 2]);
        m.set(1, 1, 0);
        assert_eq!(m.row_sum(1), 0);
        assert_eq!(m.to_tour(), None);

        let mut m = BinaryAssignment::from_tour(&[0, 1, 2]);
        m.set(0, 1, 1);
        assert_eq!(m.row_sum(0), 2);
        assert_eq!(m.to_tour(), None);

        // City 0 fills two positions while position sums stay 1.
        let m = BinaryAssignment::from_cells(2, vec![1, 1, 0, 0]).unwrap();
        assert_eq!(m.to_tour(), None);
        assert!(!m.is_one_hot());
    }

    #[test]
    fn test_non_binary_cell_is_invalid() {
        let m = BinaryAssignment::from_cells(1, vec![2]).unwrap();
        assert!(!m.is_one_hot());
        assert_eq!(m.to_tour(), None);
        assert!(BinaryAssignment::from_cells(2, vec![0; 3]).is_none());

        // Every position holds exactly one 1, but a stray 2 sits in row 0.
        let mut m = BinaryAssignment::from_tour(&[0, 1]);
        m.set(0, 1, 2);
        assert_eq!(m.to_tour(), None);
        assert!(!m.is_one_hot());
    }

    #[test]
    fn test_swap_rows_and_columns() {
        let mut m = BinaryAssignment::from_tour(&[0, 1, 2, 3]);
        m.swap_rows(3, 1);
        assert_eq!(m.to_tour(), Some(vec![0, 3, 2, 1]));
        m.swap_columns(0, 2);
        assert_eq!(m.to_tour(), Some(vec![2, 3, 0, 1]));
        m.swap_rows(2, 2);
        assert_eq!(m.to_tour(), Some(vec![2, 3, 0, 1]));
    }

    #[test]
    fn test_rotate_columns() {
        let mut m = BinaryAssignment::from_tour(&[0, 1, 2, 3, 4]);
        m.rotate_columns_right(1, 4);
        assert_eq!(m.to_tour(), Some(vec![0, 3, 1, 2, 4]));
        assert!(m.is_one_hot());
    }

    #[test]
    fn test_flip() {
        let mut m = BinaryAssignment::zeros(2);
        m.flip(0, 1);
        assert_eq!(m.get(0, 1), 1);
        m.flip(0, 1);
        assert_eq!(m.get(0, 1), 0);
        assert_eq!(m.active().count(), 0);
    }
}
