//! Stable arena indices for catalogue and graph entities.
//!
//! Stops and buses live in append-only arenas owned by the
//! [`NetworkStore`](crate::catalogue::NetworkStore); every structure that
//! refers to them (distance table, hub table, edge metadata) stores one of
//! these indices instead of a reference.

use std::fmt;

macro_rules! impl_index {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Index of the next element pushed onto an arena of length `len`.
            pub(crate) fn next(len: usize) -> Self {
                debug_assert!(len < u32::MAX as usize, "arena overflow");
                Self(len as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

impl_index!(StopId);
impl_index!(BusId);
impl_index!(VertexId);
impl_index!(EdgeId);
