//! Per-layer quantities computed by the stages, and the [`QuantitySet`] bitset.

use std::fmt;

/// A per-layer quantity produced by one stage and consumed by later ones.
///
/// Most quantities hold one value per layer. The two reactant quantities
/// hold one value per kinetic reaction per layer; their width is declared
/// by the stage that writes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quantity {
    /// Depth of the layer's top (m).
    BurialTop,
    /// Depth of the layer's base (m).
    BurialBottom,
    /// Mean porosity across the layer (fraction).
    Porosity,
    /// Midpoint temperature (°C).
    Temperature,
    /// Unreacted fraction of each vitrinite reaction.
    ReflectanceReactants,
    /// Vitrinite reflectance (%Ro).
    Maturity,
    /// Unreacted fraction of each kerogen reaction.
    KerogenReactants,
    /// Transformation ratio (fraction).
    Transformation,
    /// Generation rate (kg HC / m² / Myr).
    Generation,
    /// Cumulative expelled mass (kg HC / m²).
    Expulsion,
}

impl Quantity {
    /// Every quantity, in pipeline order.
    pub const ALL: [Quantity; 10] = [
        Self::BurialTop,
        Self::BurialBottom,
        Self::Porosity,
        Self::Temperature,
        Self::ReflectanceReactants,
        Self::Maturity,
        Self::KerogenReactants,
        Self::Transformation,
        Self::Generation,
        Self::Expulsion,
    ];

    /// Stable bit position of this quantity.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Short snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::BurialTop => "burial_top",
            Self::BurialBottom => "burial_bottom",
            Self::Porosity => "porosity",
            Self::Temperature => "temperature",
            Self::ReflectanceReactants => "reflectance_reactants",
            Self::Maturity => "maturity",
            Self::KerogenReactants => "kerogen_reactants",
            Self::Transformation => "transformation",
            Self::Generation => "generation",
            Self::Expulsion => "expulsion",
        }
    }

    /// Whether the quantity is kinetic state carried between steps rather
    /// than a reported result.
    pub fn is_internal(self) -> bool {
        matches!(self, Self::ReflectanceReactants | Self::KerogenReactants)
    }

    fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`Quantity`] values stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QuantitySet {
    bits: u16,
}

impl QuantitySet {
    /// Create an empty set.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Insert a quantity.
    pub fn insert(&mut self, quantity: Quantity) {
        self.bits |= 1 << quantity.index();
    }

    /// Builder-style insert.
    pub fn with(mut self, quantity: Quantity) -> Self {
        self.insert(quantity);
        self
    }

    /// Check whether the set contains a quantity.
    pub fn contains(&self, quantity: Quantity) -> bool {
        self.bits & (1 << quantity.index()) != 0
    }

    /// `self | other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// `self & other`.
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Elements in `self` but not `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Check whether `self` is a subset of `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of quantities in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        let bits = self.bits;
        (0..16u32)
            .filter(move |i| bits & (1 << i) != 0)
            .filter_map(Quantity::from_index)
    }
}

impl FromIterator<Quantity> for QuantitySet {
    fn from_iter<I: IntoIterator<Item = Quantity>>(iter: I) -> Self {
        let mut set = Self::empty();
        for q in iter {
            set.insert(q);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn indices_are_distinct_and_dense() {
        for (i, q) in Quantity::ALL.iter().enumerate() {
            assert_eq!(q.index() as usize, i);
        }
    }

    #[test]
    fn empty_set() {
        let s = QuantitySet::empty();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert!(!s.contains(Quantity::Maturity));
    }

    #[test]
    fn iter_follows_pipeline_order() {
        let s: QuantitySet = [Quantity::Generation, Quantity::BurialTop, Quantity::Maturity]
            .into_iter()
            .collect();
        let v: Vec<_> = s.iter().collect();
        assert_eq!(
            v,
            vec![Quantity::BurialTop, Quantity::Maturity, Quantity::Generation]
        );
    }

    #[test]
    fn internal_quantities() {
        assert!(Quantity::KerogenReactants.is_internal());
        assert!(!Quantity::Transformation.is_internal());
    }

    fn arb_quantity() -> impl Strategy<Value = Quantity> {
        (0..Quantity::ALL.len()).prop_map(|i| Quantity::ALL[i])
    }

    fn arb_set() -> impl Strategy<Value = QuantitySet> {
        prop::collection::vec(arb_quantity(), 0..10).prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn union_is_commutative(a in arb_set(), b in arb_set()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn difference_is_disjoint(a in arb_set(), b in arb_set()) {
            prop_assert!(a.difference(&b).intersection(&b).is_empty());
        }

        #[test]
        fn subset_of_union(a in arb_set(), b in arb_set()) {
            let u = a.union(&b);
            prop_assert!(a.is_subset(&u));
            prop_assert!(b.is_subset(&u));
        }

        #[test]
        fn len_matches_iter(a in arb_set()) {
            prop_assert_eq!(a.len(), a.iter().count());
        }
    }
}
