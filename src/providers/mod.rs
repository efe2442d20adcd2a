// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::ActivityRecord;

pub mod strava;

/// Retrieval of a user's raw activity records
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Every activity started after the Unix timestamp `after`
    async fn activities_since(&self, access_token: &str, after: i64) -> Result<Vec<ActivityRecord>>;

    fn provider_name(&self) -> &'static str;
}
