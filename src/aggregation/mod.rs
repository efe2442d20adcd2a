// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Aggregation Module
//!
//! Derived views over a user's normalized activities.
//!
//! This module includes:
//! - Year-to-date summary and narrative facts
//! - Weekly, monthly and daily trend series
//! - Ranked highlight lists and calendar drill-downs
//! - The end-of-year wrapped report
//!
//! Every view is computed from scratch on each call and owned by the
//! caller. Only the wrapped report awaits anything, and only when a kudos
//! source is supplied.

pub mod calendar;
pub mod facts;
pub mod highlights;
pub mod normalize;
pub mod summary;
pub mod trends;
pub mod wrapped;

pub use facts::{facts, FactSet};
pub use highlights::{
    activities_in_period, activities_on_day, highlights, ActivityHighlight, HighlightSet,
};
pub use summary::{summarize, summarize_at, SummaryView};
pub use trends::{trends, DailyPoint, TrendPoint, TrendSeries, WeekdayStat};
pub use wrapped::{
    build_wrapped, build_wrapped_at, CumulativePoint, HeatmapPoint, KeyStat, KudosTally,
    MonthlyDistance, TimeOfDayCount, WrappedActivity, WrappedReport,
};
