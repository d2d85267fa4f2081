use std::iter::FromIterator;
use std::ops::{Index, IndexMut};

use crate::{Position, XyXtd};

/// An ordered sequence of [`Position`]s: the bare geometry of a voyage.
///
/// Like a line string, the inner `Vec` is public; the newtype exists so the
/// `fairway` crate can hang trajectory algorithms (lengths, resampling,
/// distance measures) off a dedicated type.
///
/// # Examples
///
/// ```
/// use fairway_types::{Position, XyList};
///
/// let track: XyList = vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)]
///     .into_iter()
///     .map(Position::from)
///     .collect();
/// assert_eq!(track.len(), 3);
/// assert_eq!(track[1], Position::new(0.5, 0.5));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XyList(pub Vec<Position>);

/// An ordered sequence of [`XyXtd`] waypoints: a voyage with its
/// cross-track error envelope.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct XyXtdList(pub Vec<XyXtd>);

macro_rules! impl_waypoint_list {
    ($list:ident, $item:ty) => {
        impl $list {
            pub fn new(items: Vec<$item>) -> Self {
                $list(items)
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }

            pub fn as_slice(&self) -> &[$item] {
                &self.0
            }

            pub fn first(&self) -> Option<&$item> {
                self.0.first()
            }

            pub fn last(&self) -> Option<&$item> {
                self.0.last()
            }
        }

        impl From<Vec<$item>> for $list {
            fn from(items: Vec<$item>) -> Self {
                $list(items)
            }
        }

        impl FromIterator<$item> for $list {
            fn from_iter<I: IntoIterator<Item = $item>>(iter: I) -> Self {
                $list(iter.into_iter().collect())
            }
        }

        impl Index<usize> for $list {
            type Output = $item;

            fn index(&self, index: usize) -> &$item {
                &self.0[index]
            }
        }

        impl IndexMut<usize> for $list {
            fn index_mut(&mut self, index: usize) -> &mut $item {
                &mut self.0[index]
            }
        }

        impl<'a> IntoIterator for &'a $list {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl IntoIterator for $list {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<$item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}

impl_waypoint_list!(XyList, Position);
impl_waypoint_list!(XyXtdList, XyXtd);

impl XyList {
    /// The same voyage travelled in the opposite direction.
    pub fn reversed(&self) -> Self {
        XyList(self.0.iter().rev().copied().collect())
    }
}

impl XyXtdList {
    /// The same voyage travelled in the opposite direction.
    ///
    /// Reversing the direction of travel mirrors the envelope: what was to
    /// portside is now to starboard, so the XTD half-widths are swapped on
    /// every waypoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use fairway_types::{Position, Xtd, XyXtd, XyXtdList};
    ///
    /// let leg = XyXtdList::new(vec![
    ///     XyXtd::new(Position::new(0.0, 0.0), Xtd::new(100.0, 300.0)),
    ///     XyXtd::new(Position::new(0.0, 1.0), Xtd::new(150.0, 250.0)),
    /// ]);
    /// let rev = leg.reversed();
    /// assert_eq!(rev[0].pos, Position::new(0.0, 1.0));
    /// assert_eq!(rev[0].xtd, Xtd::new(250.0, 150.0));
    /// ```
    pub fn reversed(&self) -> Self {
        XyXtdList(
            self.0
                .iter()
                .rev()
                .map(|wp| XyXtd::new(wp.pos, wp.xtd.mirrored()))
                .collect(),
        )
    }

    /// Drops the envelopes, keeping the bare geometry.
    pub fn to_xy_list(&self) -> XyList {
        self.0.iter().map(|wp| wp.pos).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Xtd;

    fn sample() -> XyXtdList {
        XyXtdList::new(vec![
            XyXtd::new(Position::new(0.0, 0.0), Xtd::new(100.0, 200.0)),
            XyXtd::new(Position::new(1.0, 0.0), Xtd::new(300.0, 400.0)),
            XyXtd::new(Position::new(2.0, 0.0), Xtd::new(500.0, 600.0)),
        ])
    }

    #[test]
    fn reversed_reverses_order_and_swaps_envelope() {
        let rev = sample().reversed();
        assert_eq!(rev[0].pos, Position::new(2.0, 0.0));
        assert_eq!(rev[0].xtd, Xtd::new(600.0, 500.0));
        assert_eq!(rev[2].pos, Position::new(0.0, 0.0));
        assert_eq!(rev[2].xtd, Xtd::new(200.0, 100.0));
    }

    #[test]
    fn double_reversal_is_identity() {
        let list = sample();
        assert_eq!(list.reversed().reversed(), list);
    }

    #[test]
    fn to_xy_list_keeps_positions() {
        let xy = sample().to_xy_list();
        assert_eq!(xy.len(), 3);
        assert_eq!(xy[2], Position::new(2.0, 0.0));
    }
}
