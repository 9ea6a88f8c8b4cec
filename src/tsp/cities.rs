//! City sets.

use crate::error::AnnealError;
use std::collections::HashMap;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A named city.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct City {
    pub name: String,
    pub position: Point,
}

/// An ordered, validated collection of cities.
///
/// A city's index is its position in insertion order. Tours and QUBO
/// assignments refer to cities by this index.
#[derive(Debug, Clone, Default)]
pub struct CitySet {
    cities: Vec<City>,
    index: HashMap<String, usize>,
}

impl CitySet {
    /// Builds a city set from `(name, (x, y))` pairs.
    ///
    /// # Errors
    ///
    /// - [`AnnealError::DuplicateCity`] if a name appears twice
    /// - [`AnnealError::NonFiniteCoordinate`] if a coordinate is NaN or infinite
    ///
    /// # Examples
    ///
    /// ```
    /// use u_anneal::tsp::CitySet;
    ///
    /// let cities = CitySet::new([("AA", (0.0, 0.0)), ("AB", (3.0, 4.0))]).unwrap();
    /// assert_eq!(cities.len(), 2);
    /// assert_eq!(cities.index_of("AB"), Some(1));
    /// ```
    pub fn new<I, S, P>(cities: I) -> Result<Self, AnnealError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<Point>,
    {
        let mut set = CitySet::default();
        for (name, position) in cities {
            let name = name.into();
            let position = position.into();
            if !position.x.is_finite() || !position.y.is_finite() {
                return Err(AnnealError::NonFiniteCoordinate {
                    name,
                    x: position.x,
                    y: position.y,
                });
            }
            if set.index.contains_key(&name) {
                return Err(AnnealError::DuplicateCity(name));
            }
            set.index.insert(name.clone(), set.cities.len());
            set.cities.push(City { name, position });
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&City> {
        self.cities.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, City> {
        self.cities.iter()
    }

    /// Index of the city named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Positions in index order.
    pub fn positions(&self) -> Vec<Point> {
        self.cities.iter().map(|c| c.position).collect()
    }

    /// Maps city indices to names. Panics on an out-of-range index.
    pub fn names_of(&self, tour: &[usize]) -> Vec<String> {
        tour.iter().map(|&i| self.cities[i].name.clone()).collect()
    }

    /// Maps city names to indices.
    pub fn tour_from_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, AnnealError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.index_of(name)
                    .ok_or_else(|| AnnealError::UnknownCity(name.to_string()))
            })
            .collect()
    }

    /// Whether `tour` visits every city exactly once.
    pub fn is_permutation(&self, tour: &[usize]) -> bool {
        if tour.len() != self.len() {
            return false;
        }
        let mut seen = vec![false; self.len()];
        for &city in tour {
            match seen.get_mut(city) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}

impl<'a> IntoIterator for &'a CitySet {
    type Item = &'a City;
    type IntoIter = std::slice::Iter<'a, City>;

    fn into_iter(self) -> Self::IntoIter {
        self.cities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_index() {
        let cities = CitySet::new([("B", (1.0, 0.0)), ("A", (0.0, 0.0))]).unwrap();
        assert_eq!(cities.index_of("B"), Some(0));
        assert_eq!(cities.index_of("A"), Some(1));
        assert_eq!(cities.index_of("Z"), None);
        assert_eq!(cities.get(1).unwrap().name, "A");
    }

    #[test]
    fn test_rejects_duplicate() {
        let err = CitySet::new([("A", (0.0, 0.0)), ("A", (1.0, 1.0))]).unwrap_err();
        assert_eq!(err, AnnealError::DuplicateCity("A".into()));
    }

    #[test]
    fn test_rejects_non_finite() {
        let err = CitySet::new([("A", (f64::NAN, 0.0))]).unwrap_err();
        assert!(matches!(err, AnnealError::NonFiniteCoordinate { .. }));
        assert!(CitySet::new([("A", (0.0, f64::INFINITY))]).is_err());
    }

    #[test]
    fn test_empty_set() {
        let cities = CitySet::new(Vec::<(String, (f64, f64))>::new()).unwrap();
        assert!(cities.is_empty());
        assert!(cities.is_permutation(&[]));
    }

    #[test]
    fn test_name_round_trip() {
        let cities =
            CitySet::new([("AA", (0.0, 0.0)), ("AB", (1.0, 0.0)), ("AC", (2.0, 0.0))]).unwrap();
        let names = cities.names_of(&[2, 0, 1]);
        assert_eq!(names, ["AC", "AA", "AB"]);
        assert_eq!(cities.tour_from_names(&names).unwrap(), vec![2, 0, 1]);
        assert_eq!(
            cities.tour_from_names(&["AA", "ZZ"]).unwrap_err(),
            AnnealError::UnknownCity("ZZ".into())
        );
    }

    #[test]
    fn test_is_permutation() {
        let cities =
            CitySet::new([("A", (0.0, 0.0)), ("B", (1.0, 0.0)), ("C", (2.0, 0.0))]).unwrap();
        assert!(cities.is_permutation(&[1, 2, 0]));
        assert!(!cities.is_permutation(&[1, 1, 0]));
        assert!(!cities.is_permutation(&[1, 2]));
        assert!(!cities.is_permutation(&[1, 2, 3]));
    }
}
