pub mod stats;

pub use self::stats::{Cell, CleanTable, Column, ColumnKind, RawRow, StatsTable};
