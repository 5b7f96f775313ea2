//! Pointer interaction modes.
//!
//! Hover and click events each carry a set of active modes. Options files
//! write a set either as a single name (`"grab"`) or as a list
//! (`["bubble", "repulse"]`); both deserialize into a [`ModeSet`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A pointer interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Draw a line from nearby particles to the pointer.
    Grab,
    /// Grow nearby particles and change their opacity.
    Bubble,
    /// Push nearby particles away from the pointer.
    Repulse,
    /// Add particles at the click position (click only).
    Push,
    /// Remove the oldest particles (click only).
    Remove,
}

impl InteractionMode {
    /// Every mode, in bit order.
    pub const ALL: [InteractionMode; 5] = [
        InteractionMode::Grab,
        InteractionMode::Bubble,
        InteractionMode::Repulse,
        InteractionMode::Push,
        InteractionMode::Remove,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionMode::Grab => "grab",
            InteractionMode::Bubble => "bubble",
            InteractionMode::Repulse => "repulse",
            InteractionMode::Push => "push",
            InteractionMode::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// A set of interaction modes with constant-time membership tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModeSet(u8);

impl ModeSet {
    /// The empty set.
    pub const EMPTY: ModeSet = ModeSet(0);

    /// Create an empty set.
    pub const fn new() -> Self {
        ModeSet(0)
    }

    /// Set containing a single mode.
    pub fn single(mode: InteractionMode) -> Self {
        ModeSet(mode.bit())
    }

    /// Returns this set with `mode` added (builder style).
    pub fn with(mut self, mode: InteractionMode) -> Self {
        self.insert(mode);
        self
    }

    #[inline]
    pub fn contains(&self, mode: InteractionMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn insert(&mut self, mode: InteractionMode) {
        self.0 |= mode.bit();
    }

    pub fn remove(&mut self, mode: InteractionMode) {
        self.0 &= !mode.bit();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate modes in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = InteractionMode> + '_ {
        InteractionMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<InteractionMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = InteractionMode>>(iter: I) -> Self {
        let mut set = ModeSet::new();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl From<InteractionMode> for ModeSet {
    fn from(mode: InteractionMode) -> Self {
        ModeSet::single(mode)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// Deserialize either a single value or a list of values into a `Vec`.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

impl<'de> Deserialize<'de> for ModeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let modes: Vec<InteractionMode> = one_or_many(deserializer)?;
        Ok(modes.into_iter().collect())
    }
}

impl Serialize for ModeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let set = ModeSet::new()
            .with(InteractionMode::Grab)
            .with(InteractionMode::Repulse);

        assert!(set.contains(InteractionMode::Grab));
        assert!(set.contains(InteractionMode::Repulse));
        assert!(!set.contains(InteractionMode::Bubble));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![InteractionMode::Grab, InteractionMode::Repulse]
        );
    }

    #[test]
    fn test_remove() {
        let mut set = ModeSet::single(InteractionMode::Push);
        set.remove(InteractionMode::Push);
        assert!(set.is_empty());
        assert_eq!(set, ModeSet::EMPTY);
    }

    #[test]
    fn test_deserialize_single_and_list() {
        let single: ModeSet = serde_json::from_str("\"bubble\"").unwrap();
        assert_eq!(single, ModeSet::single(InteractionMode::Bubble));

        let many: ModeSet = serde_json::from_str("[\"grab\", \"push\"]").unwrap();
        assert!(many.contains(InteractionMode::Grab));
        assert!(many.contains(InteractionMode::Push));

        let empty: ModeSet = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(serde_json::from_str::<ModeSet>("\"explode\"").is_err());
    }

    #[test]
    fn test_serialize_as_list() {
        let set = ModeSet::single(InteractionMode::Remove);
        assert_eq!(serde_json::to_string(&set).unwrap(), "[\"remove\"]");
    }
}
